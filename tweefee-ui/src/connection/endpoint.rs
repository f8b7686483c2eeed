//! Transport endpoint

use std::fmt;

/// Where the widget connects: host, optional port and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: Option<u16>,
    path: String,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: Option<u16>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn url(&self) -> String {
        build_url(&self.host, self.port, &self.path)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// `ws://host:port/path`, or `ws://host/path` without a port.
///
/// Port 0 counts as no port.
pub fn build_url(host: &str, port: Option<u16>, path: &str) -> String {
    match port {
        Some(port) if port != 0 => format!("ws://{}:{}{}", host, port, path),
        _ => format!("ws://{}{}", host, path),
    }
}
