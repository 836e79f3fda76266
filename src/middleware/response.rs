use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;

/// Outbound response: a status and an optional JSON body.
///
/// The store's payload is relayed as-is; there is no success envelope.
#[derive(Debug, PartialEq)]
pub struct ApiResponse {
    pub status_code: StatusCode,
    pub body: Option<Value>,
}

impl ApiResponse {
    /// Create a 200 OK response
    pub fn ok(body: Value) -> Self {
        Self::with_status(body, StatusCode::OK)
    }

    /// Create a 201 Created response
    pub fn created(body: Value) -> Self {
        Self::with_status(body, StatusCode::CREATED)
    }

    /// Create an API response with custom status code
    pub fn with_status(body: Value, status_code: StatusCode) -> Self {
        Self {
            status_code,
            body: Some(body),
        }
    }

    /// Create a 204 No Content response
    pub fn no_content() -> Self {
        Self {
            status_code: StatusCode::NO_CONTENT,
            body: None,
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) if self.status_code != StatusCode::NO_CONTENT => {
                (self.status_code, Json(body)).into_response()
            }
            _ => self.status_code.into_response(),
        }
    }
}

pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;
