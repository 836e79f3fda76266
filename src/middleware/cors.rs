use axum::{
    extract::{Request, State},
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::config::{ConfigError, CorsConfig};

/// Pre-validated CORS header values
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl CorsHeaders {
    pub fn from_config(config: &CorsConfig) -> Result<Self, ConfigError> {
        let value = |name: &'static str, raw: &str| {
            HeaderValue::from_str(raw).map_err(|_| ConfigError::InvalidHeader {
                name,
                value: raw.to_string(),
            })
        };

        Ok(Self {
            allow_origin: value("CORS_ALLOW_ORIGIN", &config.allow_origin)?,
            allow_methods: value("CORS allow-methods", &config.allow_methods)?,
            allow_headers: value("CORS allow-headers", &config.allow_headers)?,
        })
    }

    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
    }
}

/// Attaches the CORS header set to every outbound response, errors included
pub async fn cors_middleware(
    State(cors): State<Arc<CorsHeaders>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    cors.apply(response.headers_mut());
    response
}
