//! Tweet History
//!
//! Bounded, newest-first buffer of the most recent tweets. New WebSocket
//! clients receive a snapshot of it as their first frame.

use std::collections::VecDeque;

use super::Tweet;

/// Bounded newest-first tweet buffer
#[derive(Debug, Clone)]
pub struct History {
    items: VecDeque<Tweet>,
    capacity: usize,
}

impl History {
    /// Create an empty history holding at most `capacity` tweets (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Place a newest-first batch in front of the history.
    ///
    /// The batch keeps its own order; tweets pushed past capacity are
    /// dropped from the back. Returns the number of tweets dropped.
    pub fn prepend_batch(&mut self, batch: &[Tweet]) -> usize {
        for tweet in batch.iter().rev() {
            self.items.push_front(tweet.clone());
        }

        let overflow = self.items.len().saturating_sub(self.capacity);
        self.items.truncate(self.capacity);
        overflow
    }

    /// Newest-first copy of the buffered tweets
    pub fn snapshot(&self) -> Vec<Tweet> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
