//! TweeFee Widget
//!
//! Live tweet feed for the browser, built with Leptos (WASM). The widget
//! keeps a WebSocket open to the TweeFee server, renders the newest
//! `maxTweets` tweets into `#tweefeed`, and reconnects after a fixed delay
//! whenever the socket closes.
//!
//! # Usage
//!
//! ```html
//! <div id="tweefeed" data-max-tweets="20"></div>
//! <script type="module">
//!   import init, { TweeFeed } from "/static/pkg/tweefee_ui.js";
//!   await init();
//!   TweeFeed.fromContainer().init();
//! </script>
//! ```
//!
//! # Architecture
//!
//! - [`connection`]: socket lifecycle state machine and its browser bindings
//! - [`feed`]: wire decoding and the bounded feed state
//! - [`format`]: autolinking and date formatting
//! - [`components`]: the rendered list and tweet cards

use leptos::*;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub mod components;
pub mod config;
pub mod connection;
pub mod console;
pub mod feed;
pub mod format;

pub use config::{ConfigError, WidgetConfig};
pub use connection::{build_url, ConnectionManager, ConnectionState, Endpoint};
pub use feed::{decode_batch, DecodeError, FeedItem, FeedSink, FeedState};

use components::FeedList;
use connection::{TimeoutScheduler, WebSocketTransport};

/// Id of the element the feed is mounted into
pub const CONTAINER_ID: &str = "tweefeed";

type BrowserManager = ConnectionManager<WebSocketTransport, TimeoutScheduler>;

#[wasm_bindgen(start)]
pub fn start() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();
}

/// The feed widget.
///
/// `construct -> init -> (connected <-> reconnecting)* -> dispose`
#[wasm_bindgen]
pub struct TweeFeed {
    config: WidgetConfig,
    manager: Option<BrowserManager>,
}

#[wasm_bindgen]
impl TweeFeed {
    #[wasm_bindgen(constructor)]
    pub fn new(
        host: String,
        port: Option<u16>,
        ws_path: String,
        max_tweets: u32,
    ) -> Result<TweeFeed, JsError> {
        let config = WidgetConfig::new(host, port, ws_path, max_tweets as usize)?;
        Ok(Self::from_config(config))
    }

    /// Read the configuration from the `data-*` attributes of `#tweefeed`
    #[wasm_bindgen(js_name = fromContainer)]
    pub fn from_container() -> Result<TweeFeed, JsError> {
        let container = container()?;
        let dataset = container.dataset();

        let location = window().location();
        let page_host = location
            .hostname()
            .map_err(|e| JsError::new(&format!("cannot read page host: {:?}", e)))?;
        let page_port = match location.port() {
            Ok(raw) if !raw.is_empty() => Some(config::parse_port(&raw)?),
            _ => None,
        };

        let config = WidgetConfig::from_attributes(|name| dataset.get(name), &page_host, page_port)?;
        Ok(Self::from_config(config))
    }

    #[wasm_bindgen(js_name = withReconnectDelay)]
    pub fn with_reconnect_delay(mut self, delay_ms: u32) -> TweeFeed {
        self.config = self.config.with_reconnect_delay(delay_ms);
        self
    }

    /// Mount the feed into `#tweefeed` and open the connection
    pub fn init(&mut self) -> Result<(), JsError> {
        if self.manager.is_some() {
            console::warn("TweeFeed already initialized");
            return Ok(());
        }

        let container = container()?;
        let max_tweets = self.config.max_tweets;
        let slot: Rc<Cell<Option<RwSignal<FeedState>>>> = Rc::new(Cell::new(None));

        let mounted = Rc::clone(&slot);
        mount_to(container, move || {
            let feed = create_rw_signal(FeedState::new(max_tweets));
            mounted.set(Some(feed));
            view! { <FeedList feed=feed /> }
        });
        let feed = slot
            .get()
            .ok_or_else(|| JsError::new("feed was not mounted"))?;

        let manager = ConnectionManager::new(
            &self.config.endpoint(),
            self.config.reconnect_delay_ms,
            WebSocketTransport::new(),
            TimeoutScheduler,
            Rc::new(feed),
        );
        manager.start();
        self.manager = Some(manager);
        Ok(())
    }

    /// Close the socket and cancel any pending reconnect. Rendered items stay.
    pub fn dispose(&self) {
        if let Some(manager) = &self.manager {
            manager.dispose();
        }
    }

    /// One of `disconnected`, `connecting`, `connected`, `disposed`
    pub fn state(&self) -> String {
        self.manager
            .as_ref()
            .map_or(ConnectionState::Disconnected, |m| m.state())
            .to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn url(&self) -> String {
        self.config.endpoint().url()
    }
}

impl TweeFeed {
    pub fn from_config(config: WidgetConfig) -> Self {
        Self {
            config,
            manager: None,
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }
}

fn container() -> Result<web_sys::HtmlElement, JsError> {
    document()
        .get_element_by_id(CONTAINER_ID)
        .ok_or_else(|| JsError::new(&format!("no #{} element on the page", CONTAINER_ID)))?
        .dyn_into::<web_sys::HtmlElement>()
        .map_err(|_| JsError::new(&format!("#{} is not an HTML element", CONTAINER_ID)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_before_init() {
        let config = WidgetConfig::new("example.com", Some(8080), "/feed", 2).unwrap();
        let widget = TweeFeed::from_config(config).with_reconnect_delay(100);

        assert_eq!(widget.url(), "ws://example.com:8080/feed");
        assert_eq!(widget.state(), "disconnected");
        assert_eq!(widget.config().reconnect_delay_ms, 100);
        widget.dispose();
        assert_eq!(widget.state(), "disconnected");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn fresh_container() -> web_sys::Element {
        if let Some(old) = document().get_element_by_id(CONTAINER_ID) {
            old.remove();
        }
        let container = document().create_element("div").unwrap();
        container.set_id(CONTAINER_ID);
        document().body().unwrap().append_child(&container).unwrap();
        container
    }

    #[wasm_bindgen_test]
    fn test_init_mounts_feed_and_connects() {
        let container = fresh_container();
        let config = WidgetConfig::new("127.0.0.1", Some(1), "/websocket", 3).unwrap();
        let mut widget = TweeFeed::from_config(config);

        assert!(widget.init().is_ok());

        assert!(container.query_selector(".tweefeed-list").unwrap().is_some());
        assert_eq!(widget.state(), "connecting");

        widget.dispose();
        assert_eq!(widget.state(), "disposed");
    }

    #[wasm_bindgen_test]
    fn test_second_init_is_ignored() {
        let container = fresh_container();
        let config = WidgetConfig::new("127.0.0.1", Some(1), "/websocket", 3).unwrap();
        let mut widget = TweeFeed::from_config(config);

        assert!(widget.init().is_ok());
        assert!(widget.init().is_ok());

        assert_eq!(container.query_selector_all(".tweefeed-list").unwrap().length(), 1);
        widget.dispose();
    }

    #[wasm_bindgen_test]
    fn test_init_without_container_fails() {
        if let Some(old) = document().get_element_by_id(CONTAINER_ID) {
            old.remove();
        }
        let config = WidgetConfig::new("127.0.0.1", Some(1), "/websocket", 3).unwrap();
        let mut widget = TweeFeed::from_config(config);

        assert!(widget.init().is_err());
        assert_eq!(widget.state(), "disconnected");
    }
}
