//! Index Page
//!
//! - GET / - Page hosting the feed widget
//!
//! The widget reads its configuration from the `data-*` attributes of the
//! `#tweefeed` container, so the page is the only place server settings
//! reach the browser.

use axum::{extract::State, response::Html};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::config::Config;

/// Location of the wasm-bindgen output under `static_dir`
const WIDGET_MODULE: &str = "/static/pkg/tweefee_ui.js";

/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_index(&state.config).into_string())
}

/// Render the index page for a configuration
pub fn render_index(config: &Config) -> Markup {
    let widget = &config.widget;
    let boot = format!(
        "import init, {{ TweeFeed }} from '{}';\nawait init();\nTweeFeed.fromContainer().init();",
        WIDGET_MODULE
    );

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "TweeFee" }
                link rel="stylesheet" href="/static/tweefeed.css";
            }
            body {
                div id="tweefeed"
                    data-host=[widget.public_host.as_deref()]
                    data-port=[widget.public_port]
                    data-ws-path=(config.server.ws_path)
                    data-max-tweets=(widget.max_tweets)
                    data-reconnect-ms=(widget.reconnect_delay_ms) {}
                script type="module" { (PreEscaped(boot)) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_has_container_and_settings() {
        let html = render_index(&Config::default()).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"id="tweefeed""#));
        assert!(html.contains(r#"data-ws-path="/websocket""#));
        assert!(html.contains(r#"data-max-tweets="20""#));
        assert!(html.contains(r#"data-reconnect-ms="5000""#));
        assert!(!html.contains("data-host"));
        assert!(!html.contains("data-port"));
        assert!(html.contains("from '/static/pkg/tweefee_ui.js'"));
        assert!(html.contains("TweeFeed.fromContainer().init()"));
    }

    #[test]
    fn test_public_endpoint_is_rendered() {
        let mut config = Config::default();
        config.widget.public_host = Some("feed.example.com".to_string());
        config.widget.public_port = Some(8080);

        let html = render_index(&config).into_string();
        assert!(html.contains(r#"data-host="feed.example.com""#));
        assert!(html.contains(r#"data-port="8080""#));
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let mut config = Config::default();
        config.widget.public_host = Some(r#"a"b<c>&"#.to_string());

        let html = render_index(&config).into_string();
        assert!(html.contains(r#"data-host="a&quot;b&lt;c&gt;&amp;""#));
        assert!(!html.contains(r#"a"b<c>"#));
    }
}
