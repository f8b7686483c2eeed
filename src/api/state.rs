//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::feed::History;
use crate::websocket::{ConnectionHub, HubConfig};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Full server configuration (the index page renders the widget section)
    pub config: Arc<Config>,
    /// Most recent tweets, newest-first
    pub history: Arc<RwLock<History>>,
    /// WebSocket connection hub for fan-out
    pub ws_hub: Arc<ConnectionHub>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Wall-clock start, reported by /health
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state sized from the configuration
    pub fn new(config: Config) -> Self {
        let history = History::new(config.server.history_size);
        let hub_config = HubConfig {
            max_connections: config.server.max_connections,
        };

        Self {
            config: Arc::new(config),
            history: Arc::new(RwLock::new(history)),
            ws_hub: Arc::new(ConnectionHub::new(hub_config)),
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}
