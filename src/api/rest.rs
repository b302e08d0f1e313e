// =============================================================================
// REST API Endpoints: Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. Read endpoints are public and never
// block on each other: each request takes its own `Arc<Engine>` snapshot.
// `/reload` requires the admin Bearer token.
//
// CORS is permissive so that a browser-hosted renderer can call the API
// directly.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

use crate::api::auth::AdminAuth;
use crate::app_state::AppState;
use crate::errors::QueryError;
use crate::view::ViewBundle;

// =============================================================================
// Router construction
// =============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/catalog", get(catalog))
        .route("/api/v1/view", get(view))
        .route("/api/v1/reload", post(reload))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    rows: usize,
    reload_count: u64,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        rows: state.engine().rows(),
        reload_count: state.reload_count(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Catalog: what a renderer needs to build its year and indicator selectors
// =============================================================================

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct CatalogResponse {
    years: Vec<i32>,
    indicators: Vec<String>,
    default_year: i32,
    display_cap: usize,
}

async fn catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let engine = state.engine();
    Json(CatalogResponse {
        years: engine.years().to_vec(),
        indicators: engine.indicator_names().to_vec(),
        default_year: engine.default_year(),
        display_cap: engine.display_cap(),
    })
}

// =============================================================================
// View
// =============================================================================

#[derive(Deserialize)]
struct ViewParams {
    /// Kept as text so a malformed year gets the same JSON error shape as
    /// an unknown one.
    year: Option<String>,
    /// Comma-separated indicator names, e.g. `ema_9,ema_21`.
    #[serde(default)]
    indicators: String,
}

fn split_names(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// A missing or blank `year` selects `default`.
fn parse_year(raw: Option<&str>, default: i32) -> Result<i32, QueryError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(s) => s
            .parse::<i32>()
            .map_err(|_| QueryError::InvalidYear(s.to_string())),
    }
}

async fn view(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ViewParams>,
) -> Result<Json<ViewBundle>, QueryError> {
    let engine = state.engine();
    let names = split_names(&params.indicators);

    parse_year(params.year.as_deref(), engine.default_year())
        .and_then(|year| engine.view(year, &names))
        .map(Json)
        .map_err(|e| {
            debug!(year = ?params.year, indicators = ?names, error = %e, "view rejected");
            e
        })
}

// =============================================================================
// Reload (authenticated)
// =============================================================================

#[derive(Serialize)]
struct ReloadResponse {
    rows: usize,
    reload_count: u64,
}

async fn reload(
    _auth: AdminAuth,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let worker = state.clone();
    let result = tokio::task::spawn_blocking(move || worker.reload_from_disk())
        .await
        .map_err(|e| anyhow::anyhow!("reload task failed: {e}"))
        .and_then(|r| r);

    match result {
        Ok(engine) => Ok(Json(ReloadResponse {
            rows: engine.rows(),
            reload_count: state.reload_count(),
        })),
        Err(e) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "code": "RELOAD_FAILED",
                "error": format!("{e:#}"),
            })),
        )),
    }
}

// =============================================================================
// Tests
// =============================================================================
