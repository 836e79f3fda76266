use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Method, Request, StatusCode},
};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use crate::app::{app, AppState};
use crate::backend::{Backend, BackendError, BackendRequest, BackendResponse};
use crate::config::AppConfig;

/// Backend double that records every call and replays scripted replies.
/// With nothing scripted it answers 200 `[]`.
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<BackendRequest>>,
    replies: Mutex<VecDeque<Result<BackendResponse, BackendError>>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, status: StatusCode, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(BackendResponse::new(status, body)));
    }

    pub fn fail(&self, err: BackendError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    pub fn calls(&self) -> Vec<BackendRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        self.calls.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(BackendResponse::new(StatusCode::OK, "[]")))
    }
}

/// A `reqwest` failure that never touches the network
pub fn transport_error() -> BackendError {
    let err = reqwest::Client::new()
        .get("not a url")
        .build()
        .expect_err("relative URL must not build");
    BackendError::Transport(err)
}

pub fn test_state(backend: Arc<FakeBackend>) -> AppState {
    test_state_with(backend, &[])
}

/// State over the fake backend with extra environment variables applied
pub fn test_state_with(backend: Arc<FakeBackend>, extra: &[(&str, &str)]) -> AppState {
    let mut vars = HashMap::new();
    vars.insert("SUPABASE_URL".to_string(), "https://project.supabase.co".to_string());
    vars.insert("SUPABASE_ANON_KEY".to_string(), "test-anon-key".to_string());
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }

    let config = AppConfig::from_vars(&vars).expect("test config");
    AppState::new(&config, backend).expect("test state")
}

/// Drive one request through the full router
pub async fn call(
    state: AppState,
    method: Method,
    path: &str,
    body: Option<&str>,
) -> (StatusCode, HeaderMap, axum::body::Bytes) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .expect("request");

    let response = app(state).oneshot(request).await.expect("router response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    (status, headers, bytes)
}

/// Like `call`, with the body parsed as JSON
pub async fn call_json(
    state: AppState,
    method: Method,
    path: &str,
    body: Option<&str>,
) -> (StatusCode, HeaderMap, Value) {
    let (status, headers, bytes) = call(state, method, path, body).await;
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("response body is not JSON ({e}): {:?}", String::from_utf8_lossy(&bytes)));
    (status, headers, value)
}
