//! Tweet Feed
//!
//! Wire records accepted by the ingest API and the bounded history that is
//! replayed to every WebSocket client when it connects.
//!
//! Batches travel newest-first everywhere: in `POST /api` bodies, in the
//! history snapshot, and in broadcast frames.

mod history;
mod tweet;

pub use history::History;
pub use tweet::{parse_batch, BatchError, Entities, Tweet, UrlEntity, User};
