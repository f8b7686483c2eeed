//! Feed item wire types

use serde::Deserialize;

/// Base of every profile, status and hashtag link
pub const TWITTER_URL: &str = "https://twitter.com/";

/// One tweet as pushed by the server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedItem {
    pub id: String,
    pub date: String,
    pub content: String,
    #[serde(default)]
    pub entities: Entities,
    pub user: Author,
}

impl FeedItem {
    /// Link to the author's profile
    pub fn profile_url(&self) -> String {
        profile_url(&self.user.handle)
    }

    /// Link to the tweet itself
    pub fn status_url(&self) -> String {
        format!("{}{}/status/{}", TWITTER_URL, self.user.handle, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
    pub handle: String,
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// Embedded references. Only URLs are used for rendering; mentions and
/// hashtags are recognised in the text itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UrlEntity {
    /// Shortened URL as it appears in the text
    pub url: String,
    #[serde(default)]
    pub expanded_url: Option<String>,
    #[serde(default)]
    pub display_url: Option<String>,
}

pub fn profile_url(handle: &str) -> String {
    format!("{}{}", TWITTER_URL, handle)
}

pub fn hashtag_url(tag: &str) -> String {
    format!("{}hashtag/{}", TWITTER_URL, tag)
}
