//! Tweet Wire Format
//!
//! One record per tweet, as produced by the feed producer and consumed by
//! the browser widget.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A single tweet as it travels over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    /// Tweet identifier (Twitter `id_str`)
    pub id: String,
    /// Creation time, ISO 8601
    pub date: String,
    /// Raw tweet text
    pub content: String,
    /// Embedded entities; only `urls` is interpreted, everything else is passed through
    #[serde(default)]
    pub entities: Entities,
    /// Author
    pub user: User,
}

/// Tweet author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Screen name without the leading `@`
    pub handle: String,
    /// Display name
    pub full_name: String,
    /// Profile image URL
    #[serde(default)]
    pub avatar_url: String,
}

/// Entity block attached to a tweet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    /// Link entities used by the widget's link formatter
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
    /// Hashtags, mentions, media and anything else the producer attached
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A shortened link inside the tweet text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlEntity {
    /// Shortened URL as it appears in the text
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<[usize; 2]>,
}

/// Errors decoding an ingested batch
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Malformed batch: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Tweet at index {index} is invalid: {reason}")]
    InvalidTweet { index: usize, reason: &'static str },
}

impl Tweet {
    fn check(&self) -> Result<(), &'static str> {
        if self.id.trim().is_empty() {
            return Err("empty id");
        }
        if self.user.handle.trim().is_empty() {
            return Err("empty user handle");
        }
        Ok(())
    }
}

/// Decode a JSON array of tweets, newest-first
pub fn parse_batch(body: &[u8]) -> Result<Vec<Tweet>, BatchError> {
    let tweets: Vec<Tweet> = serde_json::from_slice(body)?;

    for (index, tweet) in tweets.iter().enumerate() {
        tweet
            .check()
            .map_err(|reason| BatchError::InvalidTweet { index, reason })?;
    }

    Ok(tweets)
}
