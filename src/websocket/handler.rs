//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle.

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::{ConnectionId, HubError};
use super::messages::Frame;
use crate::api::AppState;

/// WebSocket upgrade handler
///
/// This is the entry point for feed widgets. It upgrades the HTTP
/// connection, replays the history and then streams every new batch.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let hub = Arc::clone(&state.ws_hub);

    // Create channel for sending frames to this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<Frame>();

    let connection_id = match subscribe(&state, tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register WebSocket connection");
            let _ = sender
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::AGAIN,
                    reason: e.to_string().into(),
                })))
                .await;
            return;
        }
    };

    let conn_id_for_send = connection_id.clone();

    // Task to forward frames from channel to WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender
                .send(Message::Text(frame.as_str().to_owned()))
                .await
                .is_err()
            {
                tracing::debug!(
                    connection_id = %conn_id_for_send,
                    "WebSocket send failed, closing connection"
                );
                break;
            }
        }
    });

    let conn_id_for_recv = connection_id.clone();

    // Task to drain the client side until it closes
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&conn_id_for_recv, msg) {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    // Cleanup: unregister from hub
    hub.unregister(&connection_id).await;
}

/// Queue the history snapshot on `tx`, then register it with the hub.
///
/// Both happen under the history read lock. Ingest holds the write lock
/// until its broadcast is queued, so every batch reaches a subscriber
/// exactly once: in the snapshot or as a later frame.
async fn subscribe(
    state: &AppState,
    tx: mpsc::UnboundedSender<Frame>,
) -> Result<ConnectionId, HubError> {
    let history = state.history.read().await;
    match Frame::batch(&history.snapshot()) {
        Ok(frame) => {
            let _ = tx.send(frame);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode history snapshot");
        }
    }
    state.ws_hub.register(tx).await
}

/// Handle a received WebSocket message
///
/// The feed is one-way; client frames are logged and ignored.
/// Returns false if the connection should be closed.
fn handle_ws_message(connection_id: &str, message: Message) -> bool {
    match message {
        Message::Text(text) => {
            tracing::debug!(
                connection_id = %connection_id,
                len = text.len(),
                "Ignoring client text frame"
            );
            true
        }
        Message::Binary(data) => {
            tracing::debug!(
                connection_id = %connection_id,
                len = data.len(),
                "Ignoring client binary frame"
            );
            true
        }
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            false
        }
    }
}
