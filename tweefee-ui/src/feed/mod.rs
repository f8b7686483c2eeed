//! Feed model
//!
//! The records received from the server and the bounded, newest-first list
//! the widget renders.

pub mod decode;
pub mod item;
pub mod state;

pub use decode::{decode_batch, DecodeError};
pub use item::{Author, Entities, FeedItem, UrlEntity};
pub use state::{FeedSink, FeedState};
