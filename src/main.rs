use std::sync::Arc;

use challenge_api::app::{app, AppState};
use challenge_api::backend::RestClient;
use challenge_api::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL, SUPABASE_ANON_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Missing backend credentials are fatal at startup, never per request
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Starting Challenge API in {:?} mode", config.environment);

    let backend = Arc::new(RestClient::new(&config.backend)?);
    let state = AppState::new(&config, backend)?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!(
        backend = %config.backend.url,
        base_path = config.server.base_path.as_deref().unwrap_or("/"),
        "Challenge API listening on http://{}",
        bind_addr
    );

    axum::serve(listener, app(state)).await?;
    Ok(())
}
