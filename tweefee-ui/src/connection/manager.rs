//! Connection Manager
//!
//! Owns the socket lifecycle: open, receive, close, and reconnect after a
//! fixed delay, forever, until disposed.
//!
//! ```text
//! Disconnected -(start)-> Connecting -(open)-> Connected
//!      ^                      |                    |
//!      +------(close)---------+-------(close)------+
//!      |
//!      +-(delay)-> Connecting ...      any -(dispose)-> Disposed
//! ```
//!
//! The socket and the timer sit behind the [`Transport`] and [`Scheduler`]
//! traits so the state machine runs the same in the browser and in tests.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use thiserror::Error;

use super::Endpoint;
use crate::console;
use crate::feed::{decode_batch, DecodeError, FeedSink};

/// Fixed delay between a close and the next connection attempt
pub const DEFAULT_RECONNECT_DELAY_MS: u32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Terminal; no further connection attempts
    Disposed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disposed => "disposed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Close details reported by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
    pub clean: bool,
}

impl CloseInfo {
    /// Close synthesized when the socket could not even be created
    pub fn failed_to_open(reason: impl Into<String>) -> Self {
        Self {
            code: 1006,
            reason: reason.into(),
            clean: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot open socket to {url}: {reason}")]
    Open { url: String, reason: String },
}

/// Event handlers the manager hands to the transport on every open
pub struct TransportCallbacks {
    pub on_open: Box<dyn FnMut()>,
    pub on_message: Box<dyn FnMut(String)>,
    pub on_close: Box<dyn FnMut(CloseInfo)>,
}

/// A message socket.
///
/// Opening replaces any previous socket. After `close` no callback of the
/// closed socket may fire.
pub trait Transport {
    fn open(&mut self, url: &str, callbacks: TransportCallbacks) -> Result<(), TransportError>;
    fn close(&mut self);
}

/// Deferred execution. Dropping the returned handle cancels the task.
pub trait Scheduler {
    type Handle;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Handle;
}

struct Inner<T: Transport, S: Scheduler> {
    url: String,
    reconnect_delay_ms: u32,
    state: ConnectionState,
    transport: T,
    scheduler: S,
    pending_reconnect: Option<S::Handle>,
    sink: Rc<dyn FeedSink>,
    reconnect_attempts: u32,
}

/// Handle to a shared connection state machine. Clones drive the same
/// connection.
pub struct ConnectionManager<T: Transport, S: Scheduler> {
    inner: Rc<RefCell<Inner<T, S>>>,
}

impl<T: Transport, S: Scheduler> Clone for ConnectionManager<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Transport + 'static, S: Scheduler + 'static> ConnectionManager<T, S> {
    pub fn new(
        endpoint: &Endpoint,
        reconnect_delay_ms: u32,
        transport: T,
        scheduler: S,
        sink: Rc<dyn FeedSink>,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                url: endpoint.url(),
                reconnect_delay_ms,
                state: ConnectionState::Disconnected,
                transport,
                scheduler,
                pending_reconnect: None,
                sink,
                reconnect_attempts: 0,
            })),
        }
    }

    /// Open a new connection to the endpoint
    pub fn start(&self) {
        let callbacks = self.callbacks();

        let result = {
            let mut inner = self.inner.borrow_mut();
            if inner.state == ConnectionState::Disposed {
                return;
            }
            inner.pending_reconnect = None;
            inner.state = ConnectionState::Connecting;

            let url = inner.url.clone();
            console::log(&format!("Connecting to {}", url));
            inner.transport.open(&url, callbacks)
        };

        if let Err(e) = result {
            console::error(&e.to_string());
            self.handle_close(CloseInfo::failed_to_open(e.to_string()));
        }
    }

    pub fn handle_open(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.state != ConnectionState::Connecting {
            return;
        }
        inner.state = ConnectionState::Connected;
        inner.reconnect_attempts = 0;
        console::log(&format!("Connected to {}", inner.url));
    }

    /// Decode a batch and feed it to the sink oldest first.
    ///
    /// Returns the number of items applied. A malformed batch changes
    /// nothing and leaves the connection open.
    pub fn handle_message(&self, text: &str) -> Result<usize, DecodeError> {
        let sink = {
            let inner = self.inner.borrow();
            if inner.state == ConnectionState::Disposed {
                return Ok(0);
            }
            Rc::clone(&inner.sink)
        };

        let items = decode_batch(text)?;
        let count = items.len();
        for item in items.into_iter().rev() {
            sink.append(item);
        }
        Ok(count)
    }

    /// Any close, clean or not, schedules one reconnect after the fixed delay.
    pub fn handle_close(&self, info: CloseInfo) {
        let task = {
            let weak = Rc::downgrade(&self.inner);
            Box::new(move || {
                if let Some(manager) = Self::upgrade(&weak) {
                    manager.start();
                }
            })
        };

        let mut inner = self.inner.borrow_mut();
        if inner.state == ConnectionState::Disposed {
            return;
        }
        inner.state = ConnectionState::Disconnected;
        inner.reconnect_attempts += 1;

        let delay = inner.reconnect_delay_ms;
        console::warn(&format!(
            "Connection closed (code={}, reason={:?}), reconnecting in {} ms (attempt {})",
            info.code, info.reason, delay, inner.reconnect_attempts
        ));

        let handle = inner.scheduler.schedule(delay, task);
        inner.pending_reconnect = Some(handle);
    }

    /// Stop for good: cancel the pending reconnect and close the socket.
    pub fn dispose(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.state == ConnectionState::Disposed {
            return;
        }
        inner.state = ConnectionState::Disposed;
        inner.pending_reconnect = None;
        inner.transport.close();
        console::log("Feed disposed");
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.borrow().state
    }

    pub fn url(&self) -> String {
        self.inner.borrow().url.clone()
    }

    pub fn reconnect_delay_ms(&self) -> u32 {
        self.inner.borrow().reconnect_delay_ms
    }

    /// Closes since the last successful open
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.borrow().reconnect_attempts
    }

    pub fn has_pending_reconnect(&self) -> bool {
        self.inner.borrow().pending_reconnect.is_some()
    }

    fn upgrade(weak: &Weak<RefCell<Inner<T, S>>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn callbacks(&self) -> TransportCallbacks {
        let weak = Rc::downgrade(&self.inner);

        let on_open = {
            let weak = weak.clone();
            Box::new(move || {
                if let Some(manager) = Self::upgrade(&weak) {
                    manager.handle_open();
                }
            })
        };

        let on_message = {
            let weak = weak.clone();
            Box::new(move |text: String| {
                if let Some(manager) = Self::upgrade(&weak) {
                    if let Err(e) = manager.handle_message(&text) {
                        console::warn(&format!("Skipping batch: {}", e));
                    }
                }
            })
        };

        let on_close = Box::new(move |info: CloseInfo| {
            if let Some(manager) = Self::upgrade(&weak) {
                manager.handle_close(info);
            }
        });

        TransportCallbacks {
            on_open,
            on_message,
            on_close,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedState;
    use std::cell::Cell;
    use std::num::NonZeroUsize;

    /// In-memory socket that lets the test fire events
    #[derive(Clone, Default)]
    struct FakeTransport {
        opened: Rc<RefCell<Vec<String>>>,
        callbacks: Rc<RefCell<Option<TransportCallbacks>>>,
        closes: Rc<Cell<u32>>,
        fail_next_open: Rc<Cell<bool>>,
    }

    impl Transport for FakeTransport {
        fn open(&mut self, url: &str, callbacks: TransportCallbacks) -> Result<(), TransportError> {
            if self.fail_next_open.replace(false) {
                return Err(TransportError::Open {
                    url: url.to_string(),
                    reason: "SyntaxError".to_string(),
                });
            }
            self.opened.borrow_mut().push(url.to_string());
            *self.callbacks.borrow_mut() = Some(callbacks);
            Ok(())
        }

        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
            self.callbacks.borrow_mut().take();
        }
    }

    impl FakeTransport {
        fn with_callbacks(&self, f: impl FnOnce(&mut TransportCallbacks)) {
            let taken = self.callbacks.borrow_mut().take();
            if let Some(mut callbacks) = taken {
                f(&mut callbacks);
                let mut slot = self.callbacks.borrow_mut();
                if slot.is_none() {
                    *slot = Some(callbacks);
                }
            }
        }

        fn emit_open(&self) {
            self.with_callbacks(|cb| (cb.on_open)());
        }

        fn emit_message(&self, text: &str) {
            self.with_callbacks(|cb| (cb.on_message)(text.to_string()));
        }

        fn emit_close(&self) {
            self.with_callbacks(|cb| {
                (cb.on_close)(CloseInfo {
                    code: 1000,
                    reason: String::new(),
                    clean: true,
                })
            });
        }

        fn open_count(&self) -> usize {
            self.opened.borrow().len()
        }
    }

    struct Task {
        delay_ms: u32,
        run: Option<Box<dyn FnOnce()>>,
        cancelled: Rc<Cell<bool>>,
    }

    /// Scheduler whose tasks run only when the test fires them
    #[derive(Clone, Default)]
    struct FakeScheduler {
        tasks: Rc<RefCell<Vec<Task>>>,
    }

    struct FakeHandle {
        cancelled: Rc<Cell<bool>>,
    }

    impl Drop for FakeHandle {
        fn drop(&mut self) {
            self.cancelled.set(true);
        }
    }

    impl Scheduler for FakeScheduler {
        type Handle = FakeHandle;

        fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> FakeHandle {
            let cancelled = Rc::new(Cell::new(false));
            self.tasks.borrow_mut().push(Task {
                delay_ms,
                run: Some(task),
                cancelled: Rc::clone(&cancelled),
            });
            FakeHandle { cancelled }
        }
    }

    impl FakeScheduler {
        fn pending(&self) -> Vec<u32> {
            self.tasks
                .borrow()
                .iter()
                .filter(|t| t.run.is_some() && !t.cancelled.get())
                .map(|t| t.delay_ms)
                .collect()
        }

        /// Run the oldest live task, returning its delay
        fn fire_next(&self) -> Option<u32> {
            let (delay, run) = {
                let mut tasks = self.tasks.borrow_mut();
                let task = tasks
                    .iter_mut()
                    .find(|t| t.run.is_some() && !t.cancelled.get())?;
                (task.delay_ms, task.run.take()?)
            };
            run();
            Some(delay)
        }
    }

    struct Harness {
        manager: ConnectionManager<FakeTransport, FakeScheduler>,
        transport: FakeTransport,
        scheduler: FakeScheduler,
        feed: Rc<RefCell<FeedState>>,
    }

    fn harness(max_items: usize, delay_ms: u32) -> Harness {
        let transport = FakeTransport::default();
        let scheduler = FakeScheduler::default();
        let feed = Rc::new(RefCell::new(FeedState::new(
            NonZeroUsize::new(max_items).unwrap(),
        )));
        let manager = ConnectionManager::new(
            &Endpoint::new("example.com", Some(8080), "/feed"),
            delay_ms,
            transport.clone(),
            scheduler.clone(),
            Rc::clone(&feed) as Rc<dyn FeedSink>,
        );
        Harness {
            manager,
            transport,
            scheduler,
            feed,
        }
    }

    fn batch(ids: &[&str]) -> String {
        let items: Vec<String> = ids
            .iter()
            .map(|id| {
                format!(
                    r#"{{"id": "{}", "date": "2017-02-24T16:36:00", "content": "tweet {}",
                        "entities": {{"urls": []}},
                        "user": {{"handle": "h", "full_name": "H", "avatar_url": ""}}}}"#,
                    id, id
                )
            })
            .collect();
        format!("[{}]", items.join(","))
    }

    fn feed_ids(feed: &Rc<RefCell<FeedState>>) -> Vec<String> {
        feed.borrow().items().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_lifecycle_states() {
        let h = harness(20, DEFAULT_RECONNECT_DELAY_MS);
        assert_eq!(h.manager.state(), ConnectionState::Disconnected);

        h.manager.start();
        assert_eq!(h.manager.state(), ConnectionState::Connecting);
        assert_eq!(*h.transport.opened.borrow(), vec!["ws://example.com:8080/feed"]);

        h.transport.emit_open();
        assert_eq!(h.manager.state(), ConnectionState::Connected);

        h.transport.emit_message(&batch(&["a"]));
        assert_eq!(h.manager.state(), ConnectionState::Connected);

        h.transport.emit_close();
        assert_eq!(h.manager.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_batch_applied_oldest_first() {
        let h = harness(20, DEFAULT_RECONNECT_DELAY_MS);
        h.manager.start();
        h.transport.emit_open();

        h.transport.emit_message(&batch(&["a", "b", "c"]));

        assert_eq!(feed_ids(&h.feed), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_batches_accumulate_newest_first() {
        let h = harness(4, DEFAULT_RECONNECT_DELAY_MS);
        h.manager.start();
        h.transport.emit_open();

        h.transport.emit_message(&batch(&["b", "a"]));
        h.transport.emit_message(&batch(&["e", "d", "c"]));

        assert_eq!(feed_ids(&h.feed), vec!["e", "d", "c", "b"]);
    }

    #[test]
    fn test_malformed_batch_is_skipped() {
        let h = harness(20, DEFAULT_RECONNECT_DELAY_MS);
        h.manager.start();
        h.transport.emit_open();
        h.transport.emit_message(&batch(&["a"]));

        assert!(h.manager.handle_message("not json").is_err());
        h.transport.emit_message("[{\"id\": 1}]");
        assert_eq!(feed_ids(&h.feed), vec!["a"]);
        assert_eq!(h.manager.state(), ConnectionState::Connected);

        h.transport.emit_message(&batch(&["b"]));
        assert_eq!(feed_ids(&h.feed), vec!["b", "a"]);
    }

    #[test]
    fn test_handle_message_reports_count() {
        let h = harness(20, DEFAULT_RECONNECT_DELAY_MS);
        assert_eq!(h.manager.handle_message(&batch(&["a", "b"])).unwrap(), 2);
        assert_eq!(h.manager.handle_message("[]").unwrap(), 0);
    }

    #[test]
    fn test_reconnect_after_fixed_delay_forever() {
        let h = harness(20, 5000);
        h.manager.start();

        for round in 1..=100 {
            h.transport.emit_open();
            h.transport.emit_close();
            assert_eq!(h.scheduler.pending(), vec![5000]);
            assert_eq!(h.manager.reconnect_attempts(), 1);

            assert_eq!(h.scheduler.fire_next(), Some(5000));
            assert_eq!(h.manager.state(), ConnectionState::Connecting);
            assert_eq!(h.transport.open_count(), round + 1);
            assert!(h.scheduler.pending().is_empty());
        }
    }

    #[test]
    fn test_failed_connects_keep_retrying() {
        let h = harness(20, 250);
        h.manager.start();

        for attempt in 1..=10 {
            h.transport.emit_close();
            assert_eq!(h.manager.reconnect_attempts(), attempt);
            assert_eq!(h.scheduler.fire_next(), Some(250));
        }
        assert_eq!(h.transport.open_count(), 11);
    }

    #[test]
    fn test_open_failure_schedules_reconnect() {
        let h = harness(20, 1000);
        h.transport.fail_next_open.set(true);

        h.manager.start();

        assert_eq!(h.manager.state(), ConnectionState::Disconnected);
        assert_eq!(h.scheduler.pending(), vec![1000]);

        h.scheduler.fire_next();
        assert_eq!(h.transport.open_count(), 1);
        assert_eq!(h.manager.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_history_replay_after_reconnect_is_idempotent() {
        let h = harness(20, 1000);
        h.manager.start();
        h.transport.emit_open();
        h.transport.emit_message(&batch(&["b", "a"]));

        h.transport.emit_close();
        h.scheduler.fire_next();
        h.transport.emit_open();
        h.transport.emit_message(&batch(&["b", "a"]));

        assert_eq!(feed_ids(&h.feed), vec!["b", "a"]);
    }

    #[test]
    fn test_dispose_cancels_pending_reconnect() {
        let h = harness(20, 5000);
        h.manager.start();
        h.transport.emit_close();
        assert!(h.manager.has_pending_reconnect());

        h.manager.dispose();

        assert_eq!(h.manager.state(), ConnectionState::Disposed);
        assert!(!h.manager.has_pending_reconnect());
        assert!(h.scheduler.pending().is_empty());
        assert_eq!(h.scheduler.fire_next(), None);
        assert_eq!(h.transport.open_count(), 1);
    }

    #[test]
    fn test_dispose_closes_socket_and_ignores_events() {
        let h = harness(20, 5000);
        h.manager.start();
        h.transport.emit_open();

        h.manager.dispose();
        h.manager.dispose();
        assert_eq!(h.transport.closes.get(), 1);

        h.manager.handle_close(CloseInfo::failed_to_open("late"));
        h.manager.start();
        assert_eq!(h.manager.handle_message(&batch(&["a"])).unwrap(), 0);

        assert_eq!(h.manager.state(), ConnectionState::Disposed);
        assert!(h.scheduler.pending().is_empty());
        assert_eq!(h.transport.open_count(), 1);
        assert!(h.feed.borrow().is_empty());
    }

    #[test]
    fn test_callbacks_do_not_keep_manager_alive() {
        let h = harness(20, 5000);
        h.manager.start();
        h.transport.emit_close();

        let Harness {
            manager,
            transport,
            scheduler,
            ..
        } = h;
        drop(manager);

        assert_eq!(scheduler.fire_next(), None);
        transport.emit_open();
        assert_eq!(transport.open_count(), 1);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
        assert_eq!(ConnectionState::Disposed.as_str(), "disposed");
    }
}
