//! Health Routes
//!
//! - GET /health/live - Liveness check (process is alive)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health
///
/// Connection and history figures.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (history_len, history_capacity) = {
        let history = state.history.read().await;
        (history.len(), history.capacity())
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        connections: state.ws_connection_count().await,
        history_len,
        history_capacity,
        started_at: state.started_at,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
