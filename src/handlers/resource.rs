use axum::http::{
    header::{HeaderName, HeaderValue},
    Method,
};
use serde_json::{json, Value};
use url::Url;

use crate::app::AppState;
use crate::backend::{BackendRequest, BackendResponse};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::resources::ResourceSpec;

/// CRUD operations against one backend table. Every operation issues at most
/// one backend call.
pub struct ResourceHandler<'a> {
    state: &'a AppState,
    resource: &'static ResourceSpec,
}

impl<'a> ResourceHandler<'a> {
    pub fn new(state: &'a AppState, resource: &'static ResourceSpec) -> Self {
        Self { state, resource }
    }

    /// GET /<resource> - every row, in the store's default order
    pub async fn list(&self) -> ApiResult {
        let response = self.send(BackendRequest::new(Method::GET, self.table_url())).await?;
        let rows = response.json()?.unwrap_or_else(|| Value::Array(Vec::new()));
        Ok(ApiResponse::ok(rows))
    }

    /// GET /<resource>/<key> - always an array; no match is an empty array, not a 404
    pub async fn get(&self, key: &str) -> ApiResult {
        let response = self.send(BackendRequest::new(Method::GET, self.row_url(key))).await?;
        let rows = response.json()?.unwrap_or_else(|| Value::Array(Vec::new()));
        Ok(ApiResponse::ok(rows))
    }

    /// POST /<resource>
    pub async fn create(&self, body: Value) -> ApiResult {
        let payload = self.resource.create_payload(&body).map_err(ApiError::BadRequest)?;

        let request = BackendRequest::new(Method::POST, self.table_url()).with_body(Value::Object(payload));
        let response = self.send(self.with_preference(request)).await?;

        Ok(ApiResponse::created(self.relay_or_message(response, "created")?))
    }

    /// PATCH /<resource>/<key> - forwards only the fields present in the body
    pub async fn update(&self, key: Option<&str>, body: Value) -> ApiResult {
        let key = self.require_key(key)?;
        let payload = self.resource.update_payload(&body).map_err(ApiError::BadRequest)?;

        let request = BackendRequest::new(Method::PATCH, self.row_url(key)).with_body(Value::Object(payload));
        let response = self.send(self.with_preference(request)).await?;

        Ok(ApiResponse::ok(self.relay_or_message(response, "updated")?))
    }

    /// DELETE /<resource>/<key> - 204 whether or not the row existed
    pub async fn delete(&self, key: Option<&str>) -> ApiResult {
        let key = self.require_key(key)?;
        self.send(BackendRequest::new(Method::DELETE, self.row_url(key))).await?;
        Ok(ApiResponse::no_content())
    }

    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, ApiError> {
        tracing::debug!(resource = self.resource.route, method = %request.method, "proxying to backend");
        let response = self.state.backend.send(request).await?;
        Ok(response.error_for_status()?)
    }

    fn table_url(&self) -> Url {
        self.state.endpoints.table(self.resource.table)
    }

    fn row_url(&self, key: &str) -> Url {
        self.state.endpoints.filtered(self.resource.table, self.resource.key_column, key)
    }

    fn require_key<'k>(&self, key: Option<&'k str>) -> Result<&'k str, ApiError> {
        key.ok_or_else(|| ApiError::bad_request(self.resource.key_required_message()))
    }

    fn with_preference(&self, request: BackendRequest) -> BackendRequest {
        if !self.state.return_representation {
            return request;
        }
        request.with_header(
            HeaderName::from_static("prefer"),
            HeaderValue::from_static("return=representation"),
        )
    }

    /// Relay the store's body when there is one, otherwise confirm with a message
    fn relay_or_message(&self, response: BackendResponse, verb: &str) -> Result<Value, ApiError> {
        Ok(match response.json()? {
            Some(body) => body,
            None => json!({ "message": format!("{} {} successfully.", self.resource.label, verb) }),
        })
    }
}
