use anyhow::Context;
use reqwest::Method;
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// `--url`, then `CHALLENGE_API_URL`, then the local default
pub fn resolve_base_url(provided: Option<String>) -> String {
    provided
        .or_else(|| std::env::var("CHALLENGE_API_URL").ok())
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// Thin HTTP client for the Challenge API, the same calls the mobile app makes
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Option<Value>> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> anyhow::Result<Option<Value>> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> anyhow::Result<Option<Value>> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<Option<Value>> {
        self.request(Method::DELETE, path, None).await
    }

    /// Returns `None` for empty (204) responses
    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> anyhow::Result<Option<Value>> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "api request");

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("failed to reach {}", url))?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            anyhow::bail!("{} {}", status.as_u16(), error_message(&text));
        }
        if text.trim().is_empty() {
            return Ok(None);
        }
        let value = serde_json::from_str(&text).with_context(|| format!("invalid JSON from {}", url))?;
        Ok(Some(value))
    }
}

/// Prefer the server's `{ "error": ... }` message over the raw body
fn error_message(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| text.trim().to_string())
}
