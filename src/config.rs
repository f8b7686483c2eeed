//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides; the
//! server binary applies command-line overrides on top.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub widget: WidgetConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Result of searching the default config locations.
///
/// Nothing is logged while searching; call [`LoadedConfig::log`] once the
/// subscriber is installed.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the config came from, `None` for defaults plus environment
    pub source: Option<PathBuf>,
    /// Files that existed but failed to load
    pub skipped: Vec<(PathBuf, ConfigError)>,
}

impl LoadedConfig {
    pub fn log(&self) {
        for (path, e) in &self.skipped {
            tracing::warn!("Failed to load config from {:?}: {}", path, e);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
}

/// HTTP / WebSocket server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Path the WebSocket endpoint is mounted on
    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    /// Ingest requests are accepted only when the Host header starts with this
    #[serde(default = "default_api_allowed_host")]
    pub api_allowed_host: String,

    /// Number of tweets kept in memory and replayed to new clients
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Directory holding the compiled widget and stylesheet
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    #[serde(default)]
    pub debug: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8888
}

fn default_ws_path() -> String {
    "/websocket".to_string()
}

fn default_api_allowed_host() -> String {
    "localhost".to_string()
}

fn default_history_size() -> usize {
    50
}

fn default_max_connections() -> usize {
    1000
}

fn default_static_dir() -> String {
    "./static".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ws_path: default_ws_path(),
            api_allowed_host: default_api_allowed_host(),
            history_size: default_history_size(),
            max_connections: default_max_connections(),
            static_dir: default_static_dir(),
            debug: false,
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings handed to the browser widget through the index page
#[derive(Debug, Clone, Deserialize)]
pub struct WidgetConfig {
    /// Maximum number of tweets visible at once
    #[serde(default = "default_max_tweets")]
    pub max_tweets: usize,

    /// Delay before the widget reconnects after a close
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u32,

    /// Host the widget should dial; the page's own host when unset
    pub public_host: Option<String>,

    /// Port the widget should dial; the page's own port when unset
    pub public_port: Option<u16>,
}

fn default_max_tweets() -> usize {
    20
}

fn default_reconnect_delay() -> u32 {
    5000
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            max_tweets: default_max_tweets(),
            reconnect_delay_ms: default_reconnect_delay(),
            public_host: None,
            public_port: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "error".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> LoadedConfig {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("tweefee").join("config.toml")),
            Some(PathBuf::from("/etc/tweefee/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first of `paths` that exists and parses, falling back to
    /// defaults plus environment overrides
    pub fn load_first(paths: &[PathBuf]) -> LoadedConfig {
        let mut skipped = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    return LoadedConfig {
                        config,
                        source: Some(path.clone()),
                        skipped,
                    };
                }
                Err(e) => skipped.push((path.clone(), e)),
            }
        }

        LoadedConfig {
            config: Self::from_env(),
            source: None,
            skipped,
        }
    }

    /// Check values that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.history_size == 0 {
            return Err(ConfigError::Invalid(
                "server.history_size must be at least 1".to_string(),
            ));
        }
        if self.widget.max_tweets == 0 {
            return Err(ConfigError::Invalid(
                "widget.max_tweets must be at least 1".to_string(),
            ));
        }
        if !self.server.ws_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "server.ws_path must start with '/', got {:?}",
                self.server.ws_path
            )));
        }
        if is_reserved_path(&self.server.ws_path) {
            return Err(ConfigError::Invalid(format!(
                "server.ws_path {:?} collides with a built-in route",
                self.server.ws_path
            )));
        }
        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("TWEEFEE_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("TWEEFEE_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(allowed) = std::env::var("TWEEFEE_API_ALLOWED_HOST") {
            self.server.api_allowed_host = allowed;
        }
        if let Ok(size) = std::env::var("TWEEFEE_HISTORY_SIZE") {
            if let Ok(n) = size.parse() {
                self.server.history_size = n;
            }
        }

        if let Ok(level) = std::env::var("TWEEFEE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TWEEFEE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Exact paths served by the router besides the WebSocket endpoint
const RESERVED_PATHS: &[&str] = &["/", "/api", "/api/history"];

/// Prefixes nested under other services
const RESERVED_PREFIXES: &[&str] = &["/health", "/static"];

fn is_reserved_path(path: &str) -> bool {
    let path = path.trim_end_matches('/');
    let path = if path.is_empty() { "/" } else { path };

    RESERVED_PATHS.contains(&path)
        || RESERVED_PREFIXES
            .iter()
            .any(|prefix| path == *prefix || path.starts_with(&format!("{}/", prefix)))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# TweeFee Configuration
#
# Environment variables override these settings:
# - TWEEFEE_HOST
# - TWEEFEE_PORT
# - TWEEFEE_API_ALLOWED_HOST
# - TWEEFEE_HISTORY_SIZE
# - TWEEFEE_LOG_LEVEL
# - TWEEFEE_LOG_FORMAT

[server]
# Address to bind
host = "0.0.0.0"
port = 8888

# WebSocket endpoint path
ws_path = "/websocket"

# Only ingest requests whose Host header starts with this are accepted
api_allowed_host = "localhost"

# Number of tweets kept in memory and replayed to new clients
history_size = 50

# Maximum concurrent WebSocket clients
max_connections = 1000

# Compiled widget bundle and stylesheet
static_dir = "./static"

# Verbose request logging
debug = false

[widget]
# Maximum number of tweets visible at once
max_tweets = 20

# Delay before the widget reconnects after the socket closes (ms)
reconnect_delay_ms = 5000

# Host/port the widget should dial (defaults to the page's own)
# public_host = "feed.example.com"
# public_port = 80

[logging]
# Log level: trace, debug, info, warn, error
level = "error"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
