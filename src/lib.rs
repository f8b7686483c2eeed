//! # TweeFee
//!
//! A live tweet wall. Producers POST batches of tweets, the server keeps a
//! bounded newest-first history and pushes every batch to the browser
//! widgets connected over WebSocket. The widget itself lives in the
//! `tweefee-ui` crate.
//!
//! ## Modules
//!
//! - [`feed`]: Tweet wire format and the bounded history
//! - [`websocket`]: Connection hub and upgrade handler
//! - [`api`]: HTTP routes, index page and server startup
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tweefee::{serve, AppState, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default().config;
//!     serve(AppState::new(config)).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod feed;
pub mod websocket;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, ApiResult, AppState};

pub use config::{Config, ConfigError, LoadedConfig, LoggingConfig, ServerConfig, WidgetConfig};

pub use feed::{parse_batch, BatchError, Entities, History, Tweet, UrlEntity, User};

pub use websocket::{websocket_handler, ConnectionHub, Frame, HubConfig, HubError};
