use axum::{
    body::Bytes,
    extract::State,
    http::{Method, Uri},
    middleware,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::backend::{Backend, RestEndpoints};
use crate::config::{AppConfig, ConfigError};
use crate::handlers;
use crate::middleware::{cors_middleware, CorsHeaders};
use crate::resources::{self, ResourceSpec};

/// Per-process handler state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub endpoints: RestEndpoints,
    pub return_representation: bool,
    pub cors: Arc<CorsHeaders>,
    pub base_path: Option<String>,
}

impl AppState {
    pub fn new(config: &AppConfig, backend: Arc<dyn Backend>) -> Result<Self, ConfigError> {
        Ok(Self {
            backend,
            endpoints: RestEndpoints::new(config.backend.url.clone()),
            return_representation: config.backend.return_representation,
            cors: Arc::new(CorsHeaders::from_config(&config.cors)?),
            base_path: config.server.base_path.clone(),
        })
    }
}

pub fn app(state: AppState) -> Router {
    let cors = state.cors.clone();

    let mut resource_router = Router::new();
    for resource in resources::ALL {
        resource_router = resource_router.merge(resource_routes(resource));
    }
    if let Some(base_path) = &state.base_path {
        resource_router = Router::new().nest(base_path, resource_router);
    }

    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Table proxies
        .merge(resource_router)
        // Preflight on any other path, 404 otherwise
        .fallback(handlers::fallback)
        // Global middleware
        .layer(middleware::from_fn_with_state(cors, cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Collection and member paths both go through the dispatcher, which decides
/// from the trailing segment whether a key was given.
fn resource_routes(resource: &'static ResourceSpec) -> Router<AppState> {
    let handler = move |State(state): State<AppState>, method: Method, uri: Uri, body: Bytes| async move {
        handlers::dispatch(&state, resource, method, uri, body).await
    };

    Router::new()
        .route(&format!("/{}", resource.route), any(handler.clone()))
        .route(&format!("/{}/", resource.route), any(handler.clone()))
        .route(&format!("/{}/*rest", resource.route), any(handler))
}
