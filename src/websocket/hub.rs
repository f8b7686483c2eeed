//! WebSocket Connection Hub
//!
//! Keeps one channel sender per live connection and fans frames out to all
//! of them. Each connection drains its own channel in a dedicated task, so a
//! slow client never blocks ingest.

use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::messages::Frame;

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

/// Registry of live WebSocket connections
pub struct ConnectionHub {
    /// Active connections: ConnectionId → frame sender
    connections: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<Frame>>>,
    config: HubConfig,
}

/// Configuration for the connection hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
        }
    }
}

impl ConnectionHub {
    /// Create a new connection hub
    pub fn new(config: HubConfig) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Register a new WebSocket connection
    ///
    /// Returns the connection ID on success, or an error if the connection
    /// limit has been reached.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<Frame>,
    ) -> Result<ConnectionId, HubError> {
        let mut connections = self.connections.write().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections(self.config.max_connections));
        }

        let id = Uuid::new_v4().to_string();
        connections.insert(id.clone(), sender);

        tracing::info!(
            connection_id = %id,
            connections = connections.len(),
            "WebSocket connected"
        );
        Ok(id)
    }

    /// Unregister a connection
    pub async fn unregister(&self, id: &str) {
        let mut connections = self.connections.write().await;
        if connections.remove(id).is_some() {
            tracing::info!(
                connection_id = %id,
                connections = connections.len(),
                "WebSocket disconnected"
            );
        }
    }

    /// Send a frame to every connection
    ///
    /// Returns the number of connections the frame was queued for. Senders
    /// whose receiving task has gone away are skipped; their handler
    /// unregisters them on its way out.
    pub async fn broadcast(&self, frame: &Frame) -> usize {
        let connections = self.connections.read().await;

        let mut sent_count = 0;
        for (id, sender) in connections.iter() {
            if sender.send(frame.clone()).is_ok() {
                sent_count += 1;
            } else {
                tracing::debug!(connection_id = %id, "Dropping frame for closed connection");
            }
        }

        tracing::debug!(
            recipients = sent_count,
            bytes = frame.as_str().len(),
            "Broadcast batch"
        );
        sent_count
    }

    /// Get the current connection count
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

/// Errors that can occur in the connection hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),
}
