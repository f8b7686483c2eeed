//! Connection to the feed server

pub mod browser;
pub mod endpoint;
pub mod manager;

pub use browser::{TimeoutScheduler, WebSocketTransport};
pub use endpoint::{build_url, Endpoint};
pub use manager::{
    CloseInfo, ConnectionManager, ConnectionState, Scheduler, Transport, TransportCallbacks,
    TransportError, DEFAULT_RECONNECT_DELAY_MS,
};
