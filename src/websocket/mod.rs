//! WebSocket Fan-Out
//!
//! Pushes tweet batches to every connected feed widget.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: registry of live connections, broadcasts frames to all of them
//! - **Handler**: upgrades the HTTP request, replays history, forwards broadcasts
//! - **Frame**: a pre-encoded JSON batch shared by every recipient
//!
//! ## Protocol
//!
//! Every server frame is a text message holding a JSON array of tweets,
//! newest-first. The first frame after the upgrade is the current history;
//! every later frame is one ingested batch. Client frames are ignored.
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8888/websocket');
//! ws.onmessage = (event) => {
//!   const tweets = JSON.parse(event.data);
//!   tweets.reverse().forEach(render);
//! };
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, ConnectionId, HubConfig, HubError};
pub use messages::Frame;
