//! Stream Tips Server
//!
//! Environment variables:
//! - PORT: listen port (default 3000)
//! - GEMINI_API_KEY: enables AI tier generation (optional, falls back to static tiers)
//! - GEMINI_API_URL: override the Gemini generateContent endpoint
//! - RUST_LOG: log filter

use anyhow::Result;
use std::sync::Arc;
use stream_tips::config::{Config, DEFAULT_LOG_FILTER};
use stream_tips::routes::create_router;
use stream_tips::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(filter)
        .init();

    info!("Starting Stream Tips Server");

    let config = Config::from_env()?;

    info!("Configuration:");
    info!("  Port: {}", config.port);
    info!(
        "  Gemini API: {}",
        if config.gemini_api_key.is_some() {
            "(configured)"
        } else {
            "(not set - static tiers only)"
        }
    );
    info!("  Gemini endpoint: {}", config.gemini_api_url);

    let state = Arc::new(AppState::from_config(&config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Stream Tips Server listening on {}", listener.local_addr()?);
    info!("Endpoints:");
    info!("  GET  /tips/suggest       - Static tier suggestions");
    info!("  POST /tips               - Generate tiers (AI when configured)");
    info!("  POST /analytics/payments - Payment analytics snapshot");
    info!("  POST /leaderboard        - Supporter leaderboard");
    info!("  GET  /health             - Health check");

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
