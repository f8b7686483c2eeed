//! Data Transfer Objects
//!
//! Response types for the JSON endpoints. Tweet batches themselves are
//! plain arrays of [`crate::feed::Tweet`] and need no wrapper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full health status
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests
    pub status: String,
    /// Connected WebSocket clients
    pub connections: usize,
    /// Tweets currently held in history
    pub history_len: usize,
    /// History capacity
    pub history_capacity: usize,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub version: String,
}
