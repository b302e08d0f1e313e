// =============================================================================
// Trendline Engine: Main Entry Point
// =============================================================================
//
// Startup is strictly ordered: config → price data → engine build → HTTP
// server. Any failure before the server binds aborts the process; the API
// never serves a partially built engine.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod engine;
mod errors;
mod indicators;
mod market_data;
mod partition;
mod runtime_config;
mod series;
mod types;
mod view;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::engine::Engine;
use crate::runtime_config::RuntimeConfig;

const DEFAULT_CONFIG_PATH: &str = "trendline_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Trendline engine starting up");

    let config_path =
        std::env::var("TRENDLINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut config = if std::path::Path::new(&config_path).exists() {
        RuntimeConfig::load(&config_path)?
    } else {
        warn!(path = %config_path, "config file not found, using defaults");
        RuntimeConfig::default()
    };
    config.apply_overrides(|key| std::env::var(key).ok());

    // ── 2. Load data and build the engine ────────────────────────────────
    let points = market_data::loader::load_price_points(&config.data_path)?;
    let engine = Engine::build(&config, points).context("engine initialisation failed")?;

    info!(
        rows = engine.rows(),
        years = ?engine.years(),
        indicators = ?engine.indicator_names(),
        "engine ready"
    );

    // ── 3. Serve the query API ───────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, engine));
    let app = api::rest::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!("Trendline engine stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
