// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::backend::BackendError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request - missing required fields, caught before any backend call
    BadRequest(String),

    // 404 Not Found - no resource mounted at the path
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed,

    // 500 - request body is not valid JSON
    InvalidJson(String),

    // 500 - the data store rejected the call or could not be reached.
    // The store's own status is kept for logging only.
    Backend {
        status: Option<StatusCode>,
        message: String,
    },

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::MethodNotAllowed => 405,
            ApiError::InvalidJson(_) => 500,
            ApiError::Backend { .. } => 500,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-facing error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed => "Method Not Allowed",
            ApiError::InvalidJson(msg) => msg,
            ApiError::Backend { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Status { status, body } => {
                let message = if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("Backend error").to_string()
                } else {
                    body
                };
                ApiError::Backend {
                    status: Some(status),
                    message,
                }
            }
            BackendError::Transport(e) => ApiError::Backend {
                status: None,
                message: e.to_string(),
            },
            BackendError::InvalidBody(e) => {
                ApiError::internal_server_error(format!("Invalid JSON from backend: {}", e))
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match self {
            ApiError::MethodNotAllowed => (status, self.message().to_string()).into_response(),
            _ => (status, Json(self.to_json())).into_response(),
        }
    }
}
