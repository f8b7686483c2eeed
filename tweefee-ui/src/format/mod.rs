//! Text and date formatting for tweet cards

pub mod autolink;
pub mod date;

pub use autolink::{autolink, Segment};
pub use date::{format_date, parse_date};
