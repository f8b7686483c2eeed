//! Ingest Routes
//!
//! - POST /api - Batch of tweets, newest-first
//! - GET /api/history - Current history, the same batch a new client receives
//!
//! The producer fires and forgets: ingest always answers `201 Created` and
//! drops batches it cannot use (wrong Host, malformed body) after logging.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::feed::{parse_batch, Tweet};
use crate::websocket::Frame;

/// POST /api
///
/// Ingest a batch of tweets and push it to every connected widget.
pub async fn ingest_batch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());

    if !host_allowed(host, &state.config.server.api_allowed_host) {
        tracing::warn!(
            host = ?host,
            allowed = %state.config.server.api_allowed_host,
            "Ingest from disallowed host dropped"
        );
        return StatusCode::CREATED;
    }

    let batch = match parse_batch(&body) {
        Ok(batch) => batch,
        Err(e) => {
            tracing::error!(error = %e, bytes = body.len(), "Malformed data received");
            return StatusCode::CREATED;
        }
    };

    if batch.is_empty() {
        tracing::debug!("Empty batch ignored");
        return StatusCode::CREATED;
    }

    if let Err(e) = publish_batch(&state, batch).await {
        tracing::error!(error = %e, "Failed to publish batch");
    }

    StatusCode::CREATED
}

/// GET /api/history
pub async fn history_snapshot(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let frame = {
        let history = state.history.read().await;
        Frame::batch(&history.snapshot())?
    };

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        frame.as_str().to_owned(),
    )
        .into_response())
}

/// Record a batch in history and broadcast it
///
/// Returns the number of connections the batch was queued for.
pub async fn publish_batch(state: &AppState, batch: Vec<Tweet>) -> ApiResult<usize> {
    let frame = Frame::batch(&batch)?;

    // Broadcast before releasing the history so a subscriber sees the batch
    // either in its snapshot or as a frame, never both
    let mut history = state.history.write().await;
    let dropped = history.prepend_batch(&batch);
    let recipients = state.ws_hub.broadcast(&frame).await;
    drop(history);

    tracing::info!(
        tweets = batch.len(),
        dropped,
        recipients,
        "Batch published"
    );
    Ok(recipients)
}

/// Host header check, a prefix match like `localhost` matching `localhost:8888`
fn host_allowed(host: Option<&str>, allowed: &str) -> bool {
    host.is_some_and(|h| h.starts_with(allowed))
}
