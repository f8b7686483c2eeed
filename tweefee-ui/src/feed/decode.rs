//! Batch decoding
//!
//! A frame from the server is a JSON array of tweets, newest first.

use thiserror::Error;

use super::FeedItem;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed batch: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("item {index} has an empty id")]
    MissingId { index: usize },
}

/// Decode one server frame, keeping the wire order (newest first)
pub fn decode_batch(text: &str) -> Result<Vec<FeedItem>, DecodeError> {
    let items: Vec<FeedItem> = serde_json::from_str(text)?;

    if let Some(index) = items.iter().position(|item| item.id.is_empty()) {
        return Err(DecodeError::MissingId { index });
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tweet(id: &str) -> String {
        format!(
            r#"{{"id": "{}", "date": "2017-02-24T16:36:00", "content": "tweet {}",
                "entities": {{"urls": [], "hashtags": []}},
                "user": {{"handle": "h", "full_name": "H", "avatar_url": "a.png"}}}}"#,
            id, id
        )
    }

    #[test]
    fn test_decode_keeps_wire_order() {
        let text = format!("[{},{},{}]", tweet("c"), tweet("b"), tweet("a"));
        let items = decode_batch(&text).unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_decode_empty_batch() {
        assert!(decode_batch("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_batch("{oops"), Err(DecodeError::Malformed(_))));
        assert!(matches!(
            decode_batch(r#"{"id": "1"}"#),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        let text = r#"[{"id": "1", "date": "d", "content": "c"}]"#;
        assert!(matches!(decode_batch(text), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_decode_rejects_empty_id() {
        let text = format!("[{},{}]", tweet("a"), tweet(""));
        assert!(matches!(
            decode_batch(&text),
            Err(DecodeError::MissingId { index: 1 })
        ));
    }
}
