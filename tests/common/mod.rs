#![allow(dead_code)]

use std::collections::HashMap;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};

pub const API_KEY: &str = "test-anon-key";

/// In-memory stand-in for the store's REST interface. Understands only
/// `<column>=eq.<value>` filters and `Prefer: return=representation`.
#[derive(Clone, Default)]
pub struct StubStore {
    tables: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    next_id: Arc<AtomicU64>,
}

impl StubStore {
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables.lock().unwrap().entry(table.to_string()).or_default().extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.lock().unwrap().get(table).cloned().unwrap_or_default()
    }

    /// Serve on an ephemeral port; returns the base URL
    pub async fn spawn(self) -> Result<String> {
        let router = Router::new()
            .route(
                "/rest/v1/:table",
                get(select_rows).post(insert_row).patch(update_rows).delete(delete_rows),
            )
            .with_state(self);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok(format!("http://{}", addr))
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let bearer = format!("Bearer {}", API_KEY);
    headers.get("apikey").map_or(false, |v| v == API_KEY)
        && headers.get("authorization").map_or(false, |v| v == bearer.as_str())
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid API key" }))).into_response()
}

fn wants_rows(headers: &HeaderMap) -> bool {
    headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.contains("return=representation"))
}

fn matches(row: &Value, filters: &HashMap<String, String>) -> bool {
    filters.iter().all(|(column, condition)| match condition.strip_prefix("eq.") {
        Some(expected) => match row.get(column) {
            Some(Value::String(s)) => s == expected,
            Some(other) => other.to_string() == expected,
            None => false,
        },
        None => true,
    })
}

async fn select_rows(
    State(store): State<StubStore>,
    Path(table): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if table == "unavailable" {
        return (StatusCode::SERVICE_UNAVAILABLE, "store is offline").into_response();
    }
    let rows: Vec<Value> = store.rows(&table).into_iter().filter(|r| matches(r, &filters)).collect();
    Json(Value::Array(rows)).into_response()
}

async fn insert_row(
    State(store): State<StubStore>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(mut row): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let id = store.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    row["id"] = json!(id);
    store.seed(&table, vec![row.clone()]);

    if wants_rows(&headers) {
        (StatusCode::CREATED, Json(json!([row]))).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

async fn update_rows(
    State(store): State<StubStore>,
    Path(table): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(changes): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut updated = Vec::new();
    {
        let mut tables = store.tables.lock().unwrap();
        for row in tables.entry(table).or_default().iter_mut().filter(|r| matches(r, &filters)) {
            if let (Value::Object(target), Value::Object(fields)) = (&mut *row, &changes) {
                for (k, v) in fields {
                    target.insert(k.clone(), v.clone());
                }
            }
            updated.push(row.clone());
        }
    }

    if wants_rows(&headers) {
        Json(Value::Array(updated)).into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn delete_rows(
    State(store): State<StubStore>,
    Path(table): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    store
        .tables
        .lock()
        .unwrap()
        .entry(table)
        .or_default()
        .retain(|r| !matches(r, &filters));
    StatusCode::NO_CONTENT.into_response()
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    /// Spawn the built server binary against `backend_url`
    pub async fn spawn(backend_url: &str, extra_env: &[(&str, &str)]) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_challenge-api"));
        cmd.env("PORT", port.to_string())
            .env("CHALLENGE_API_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("SUPABASE_URL", backend_url)
            .env("SUPABASE_ANON_KEY", API_KEY)
            .env("SERVER_BASE_PATH", "")
            .env("CORS_ALLOW_ORIGIN", "*")
            .env("BACKEND_RETURN_REPRESENTATION", "false")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        for (key, value) in extra_env {
            cmd.env(key, value);
        }

        let child = cmd.spawn().context("failed to spawn server binary")?;
        let server = Self { port, base_url, child };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Fresh store plus a server bound to it
pub async fn start(store: &StubStore, extra_env: &[(&str, &str)]) -> Result<TestServer> {
    let backend_url = store.clone().spawn().await?;
    TestServer::spawn(&backend_url, extra_env).await
}
