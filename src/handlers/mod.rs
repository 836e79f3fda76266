// handlers/mod.rs - request dispatch for the table proxies
//
// Every resource route lands in `dispatch`, which turns method + path into one
// `ResourceHandler` operation and converts any failure into an error response.

pub mod resource;

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, Uri},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::resources::{self, ResourceSpec};

pub use resource::ResourceHandler;

/// Route one request to a resource operation
pub async fn dispatch(
    state: &AppState,
    resource: &'static ResourceSpec,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    match route(state, resource, &method, uri.path(), &body).await {
        Ok(response) => response.into_response(),
        Err(err) => {
            log_failure(&method, &uri, &err);
            err.into_response()
        }
    }
}

async fn route(
    state: &AppState,
    resource: &'static ResourceSpec,
    method: &Method,
    path: &str,
    body: &Bytes,
) -> ApiResult {
    if method == Method::OPTIONS {
        return Ok(ApiResponse::no_content());
    }

    let key = resource.parse_key(path);
    let handler = ResourceHandler::new(state, resource);

    match *method {
        Method::GET => match key {
            Some(key) => handler.get(&key).await,
            None => handler.list().await,
        },
        Method::POST if !resource.read_only => handler.create(parse_json(body)?).await,
        Method::PATCH if !resource.read_only => handler.update(key.as_deref(), parse_json(body)?).await,
        Method::DELETE if !resource.read_only => handler.delete(key.as_deref()).await,
        _ => Err(ApiError::MethodNotAllowed),
    }
}

fn parse_json(body: &Bytes) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::invalid_json(e.to_string()))
}

fn log_failure(method: &Method, uri: &Uri, err: &ApiError) {
    match err {
        ApiError::Backend { status, message } => {
            tracing::error!(%method, %uri, backend_status = ?status, "backend error: {}", message)
        }
        _ if err.status_code() >= 500 => tracing::error!(%method, %uri, "internal error: {}", err),
        _ => tracing::warn!(%method, %uri, status = err.status_code(), "request rejected: {}", err),
    }
}

/// Anything no resource claims: answer preflight, 404 the rest
pub async fn fallback(method: Method, uri: Uri) -> ApiResult {
    if method == Method::OPTIONS {
        return Ok(ApiResponse::no_content());
    }
    let err = ApiError::not_found(format!("No resource at {}", uri.path()));
    log_failure(&method, &uri, &err);
    Err(err)
}

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let prefix = state.base_path.as_deref().unwrap_or("");
    let endpoints: Vec<Value> = resources::ALL
        .iter()
        .map(|resource| {
            json!({
                "path": format!("{}/{}", prefix, resource.route),
                "table": resource.table,
                "read_only": resource.read_only,
            })
        })
        .collect();

    Json(json!({
        "name": "Challenge API",
        "version": env!("CARGO_PKG_VERSION"),
        "resources": endpoints,
    }))
}

/// Liveness only; does not call the backend
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
