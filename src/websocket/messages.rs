//! WebSocket Frames
//!
//! The server only ever sends one kind of message: a batch of tweets.

use std::fmt;
use std::sync::Arc;

use crate::feed::Tweet;

/// A JSON-encoded tweet batch, encoded once and shared by every connection
#[derive(Debug, Clone, PartialEq)]
pub struct Frame(Arc<str>);

impl Frame {
    /// Encode a newest-first batch
    pub fn batch(tweets: &[Tweet]) -> Result<Self, serde_json::Error> {
        let text = serde_json::to_string(tweets)?;
        Ok(Self(Arc::from(text)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
