//! Feed state
//!
//! Bounded list of items, newest at the front. Appending past the limit
//! evicts exactly one item from the back.

use leptos::{RwSignal, SignalUpdate};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::num::NonZeroUsize;

use super::FeedItem;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    items: VecDeque<FeedItem>,
    max_items: NonZeroUsize,
}

impl FeedState {
    pub fn new(max_items: NonZeroUsize) -> Self {
        Self {
            items: VecDeque::with_capacity(max_items.get()),
            max_items,
        }
    }

    /// Put `item` at the front, returning the evicted item if the feed was full.
    ///
    /// An item whose id is already shown is moved to the front instead of
    /// being displayed twice, so replaying the server history after a
    /// reconnect leaves the feed as it was.
    pub fn append(&mut self, item: FeedItem) -> Option<FeedItem> {
        if let Some(pos) = self.items.iter().position(|shown| shown.id == item.id) {
            self.items.remove(pos);
        }
        self.items.push_front(item);

        if self.items.len() > self.max_items.get() {
            self.items.pop_back()
        } else {
            None
        }
    }

    /// Items newest first
    pub fn items(&self) -> impl Iterator<Item = &FeedItem> {
        self.items.iter()
    }

    pub fn front(&self) -> Option<&FeedItem> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_items(&self) -> NonZeroUsize {
        self.max_items
    }
}

/// Destination of decoded items, one at a time, oldest first.
pub trait FeedSink {
    fn append(&self, item: FeedItem);
}

impl FeedSink for RwSignal<FeedState> {
    fn append(&self, item: FeedItem) {
        self.update(|feed| {
            feed.append(item);
        });
    }
}

impl FeedSink for RefCell<FeedState> {
    fn append(&self, item: FeedItem) {
        self.borrow_mut().append(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{Author, Entities};
    use std::rc::Rc;

    fn item(id: &str) -> FeedItem {
        FeedItem {
            id: id.to_string(),
            date: "2017-02-24T16:36:00".to_string(),
            content: format!("tweet {}", id),
            entities: Entities::default(),
            user: Author {
                handle: "h".to_string(),
                full_name: "H".to_string(),
                avatar_url: String::new(),
            },
        }
    }

    fn feed(max: usize) -> FeedState {
        FeedState::new(NonZeroUsize::new(max).unwrap())
    }

    fn ids(feed: &FeedState) -> Vec<&str> {
        feed.items().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_append_newest_first() {
        let mut feed = feed(10);
        feed.append(item("a"));
        feed.append(item("b"));

        assert_eq!(ids(&feed), vec!["b", "a"]);
        assert_eq!(feed.front().unwrap().id, "b");
    }

    #[test]
    fn test_eviction_drops_oldest() {
        let mut feed = feed(2);
        assert!(feed.append(item("x")).is_none());
        assert!(feed.append(item("y")).is_none());
        let evicted = feed.append(item("z"));

        assert_eq!(evicted.unwrap().id, "x");
        assert_eq!(ids(&feed), vec!["z", "y"]);
    }

    #[test]
    fn test_length_never_exceeds_max() {
        let mut feed = feed(3);
        for n in 0..50 {
            feed.append(item(&n.to_string()));
            assert!(feed.len() <= 3);
            assert_eq!(feed.front().unwrap().id, n.to_string());
        }
        assert_eq!(ids(&feed), vec!["49", "48", "47"]);
    }

    #[test]
    fn test_single_slot_feed() {
        let mut feed = feed(1);
        feed.append(item("a"));
        feed.append(item("b"));

        assert_eq!(ids(&feed), vec!["b"]);
    }

    #[test]
    fn test_duplicate_moves_to_front() {
        let mut feed = feed(3);
        feed.append(item("a"));
        feed.append(item("b"));
        feed.append(item("c"));

        assert!(feed.append(item("a")).is_none());
        assert_eq!(ids(&feed), vec!["a", "c", "b"]);
        assert_eq!(feed.len(), 3);
    }

    #[test]
    fn test_shared_sink_appends() {
        let shared = Rc::new(RefCell::new(feed(5)));
        let sink: Rc<dyn FeedSink> = shared.clone();
        sink.append(item("a"));
        sink.append(item("b"));

        assert_eq!(ids(&shared.borrow()), vec!["b", "a"]);
    }
}
