//! TweeFee HTTP Layer
//!
//! Built with Axum.
//!
//! # Endpoints
//!
//! ## Page
//! - `GET /` - Index page hosting the feed widget
//! - `GET /static/*` - Widget bundle and stylesheet
//!
//! ## Ingest
//! - `POST /api` - Batch of tweets, newest-first
//! - `GET /api/history` - Current history batch
//!
//! ## WebSocket
//! - `GET {ws_path}` (default `/websocket`) - History replay, then live batches
//!
//! ## Health
//! - `GET /health/live` - Liveness check
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use tweefee::api::{serve, AppState};
//! use tweefee::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::new(Config::default());
//!     serve(state).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::websocket::websocket_handler;

/// Largest accepted ingest body
const MAX_BATCH_BYTES: usize = 4 * 1024 * 1024;

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let ws_path = state.config.server.ws_path.clone();
    let static_dir = ServeDir::new(&state.config.server.static_dir);

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::index::index))
        .route("/api", post(routes::ingest::ingest_batch))
        .route("/api/history", get(routes::ingest::history_snapshot))
        .route(&ws_path, get(websocket_handler))
        .nest("/health", health_routes)
        .nest_service("/static", static_dir)
        .layer(DefaultBodyLimit::max(MAX_BATCH_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the server
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.server.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("TweeFee listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("TweeFee shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
