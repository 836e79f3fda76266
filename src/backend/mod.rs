use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::{BackendConfig, ConfigError};

/// Errors from the hosted data store
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx reply; carries the store's raw error text
    #[error("{body}")]
    Status { status: StatusCode, body: String },

    #[error("Invalid JSON from backend: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

/// One outbound call to the data store
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl BackendRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Raw reply from the data store, body kept as text
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub body: String,
}

impl BackendResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Turn any non-success status into `BackendError::Status`
    pub fn error_for_status(self) -> Result<Self, BackendError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(BackendError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }

    /// Parse the body as JSON; `None` when the store returned nothing
    pub fn json(&self) -> Result<Option<Value>, BackendError> {
        if self.body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&self.body)?))
    }
}

/// Sends requests to the data store. Shared read-only across handlers.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, BackendError>;
}

/// URL layout of the store's REST interface: `<base>/rest/v1/<table>[?<column>=eq.<value>]`
#[derive(Debug, Clone)]
pub struct RestEndpoints {
    base: Url,
}

impl RestEndpoints {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn table(&self, table: &str) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["rest", "v1", table]);
        }
        url
    }

    pub fn filtered(&self, table: &str, column: &str, value: &str) -> Url {
        let mut url = self.table(table);
        url.query_pairs_mut()
            .append_pair(column, &format!("eq.{}", value));
        url
    }
}

/// reqwest-backed client that attaches the service credentials to every call
pub struct RestClient {
    http: reqwest::Client,
    credentials: HeaderMap,
}

impl RestClient {
    pub fn new(config: &BackendConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            http: reqwest::Client::new(),
            credentials: credential_headers(&config.api_key)?,
        })
    }
}

#[async_trait]
impl Backend for RestClient {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        let headers = merge_credentials(request.headers, &self.credentials);

        tracing::debug!(method = %request.method, url = %request.url, "backend request");

        let mut builder = self.http.request(request.method, request.url).headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(serde_json::to_vec(&body)?);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, bytes = body.len(), "backend response");
        Ok(BackendResponse { status, body })
    }
}

fn credential_headers(api_key: &str) -> Result<HeaderMap, ConfigError> {
    let key = HeaderValue::from_str(api_key).map_err(|_| ConfigError::InvalidApiKey)?;
    let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
        .map_err(|_| ConfigError::InvalidApiKey)?;

    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static("apikey"), key);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Credentials win over caller-supplied values for the same header
fn merge_credentials(mut headers: HeaderMap, credentials: &HeaderMap) -> HeaderMap {
    for (name, value) in credentials {
        headers.insert(name.clone(), value.clone());
    }
    headers
}
