//! Widget configuration
//!
//! Given to the constructor directly, or read from the `data-*` attributes of
//! the mount element:
//!
//! ```html
//! <div id="tweefeed"
//!      data-host="feed.example.com" data-port="8888"
//!      data-ws-path="/websocket" data-max-tweets="20"
//!      data-reconnect-ms="5000"></div>
//! ```
//!
//! Missing host and port fall back to the page's own location.

use std::num::NonZeroUsize;
use thiserror::Error;

use crate::connection::{Endpoint, DEFAULT_RECONNECT_DELAY_MS};

pub const DEFAULT_WS_PATH: &str = "/websocket";
pub const DEFAULT_MAX_TWEETS: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("maxTweets must be a positive integer, got {0:?}")]
    InvalidMaxTweets(String),

    #[error("invalid port {0:?}")]
    InvalidPort(String),

    #[error("invalid reconnect delay {0:?}")]
    InvalidReconnectDelay(String),

    #[error("wsPath must start with '/', got {0:?}")]
    InvalidPath(String),

    #[error("host must not be empty")]
    MissingHost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub host: String,
    pub port: Option<u16>,
    pub ws_path: String,
    pub max_tweets: NonZeroUsize,
    pub reconnect_delay_ms: u32,
}

impl WidgetConfig {
    pub fn new(
        host: impl Into<String>,
        port: Option<u16>,
        ws_path: impl Into<String>,
        max_tweets: usize,
    ) -> Result<Self, ConfigError> {
        let host = host.into();
        let ws_path = ws_path.into();

        if host.is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if !ws_path.starts_with('/') {
            return Err(ConfigError::InvalidPath(ws_path));
        }
        let max_tweets = NonZeroUsize::new(max_tweets)
            .ok_or_else(|| ConfigError::InvalidMaxTweets(max_tweets.to_string()))?;

        Ok(Self {
            host,
            port,
            ws_path,
            max_tweets,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
        })
    }

    /// Build from `data-*` attributes.
    ///
    /// `attr` looks an attribute up by its dataset name (`wsPath` for
    /// `data-ws-path`); `page_host`/`page_port` describe the current page.
    pub fn from_attributes<F>(
        attr: F,
        page_host: &str,
        page_port: Option<u16>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| attr(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = present("host").unwrap_or_else(|| page_host.to_string());
        let port = match present("port") {
            Some(raw) => Some(parse_port(&raw)?),
            None if present("host").is_some() => None,
            None => page_port,
        };
        let ws_path = present("wsPath").unwrap_or_else(|| DEFAULT_WS_PATH.to_string());
        let max_tweets = match present("maxTweets") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidMaxTweets(raw.clone()))?,
            None => DEFAULT_MAX_TWEETS,
        };

        let mut config = Self::new(host, port, ws_path, max_tweets)?;
        if let Some(raw) = present("reconnectMs") {
            config.reconnect_delay_ms = raw
                .parse()
                .map_err(|_| ConfigError::InvalidReconnectDelay(raw.clone()))?;
        }
        Ok(config)
    }

    pub fn with_reconnect_delay(mut self, delay_ms: u32) -> Self {
        self.reconnect_delay_ms = delay_ms;
        self
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port, self.ws_path.clone())
    }
}

/// Parse a port given as text
pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidPort(raw.to_string()))
}
