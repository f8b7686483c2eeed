//! UI Components
//!
//! Leptos components rendering the feed.

pub mod feed_list;
pub mod tweet_card;

pub use feed_list::FeedList;
pub use tweet_card::TweetCard;
