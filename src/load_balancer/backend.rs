//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server by its position in the configured list
//! - Normalize the configured address into a base URL (HTTP mode)
//!   and a `host:port` dial address (TCP mode and probes)

use std::fmt;
use thiserror::Error;
use url::Url;

/// Error type for backend address parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("malformed address: {0}")]
    Malformed(String),

    #[error("address has no host")]
    MissingHost,

    #[error("address has no port and scheme '{0}' has no default")]
    MissingPort(String),

    #[error("unsupported scheme '{0}' (use http, or https in tcp mode)")]
    UnsupportedScheme(String),
}

/// A single backend server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    /// Position in the configured backend list.
    pub index: usize,
    /// The address exactly as configured.
    pub address: String,
    /// Base URL requests are forwarded to.
    pub base_url: Url,
    /// `host:port` used for raw TCP connections.
    pub dial_addr: String,
}

impl Backend {
    /// Parse a configured address, either `host:port` or `http(s)://host[:port][/path]`.
    ///
    /// A missing scheme defaults to `http`. `https` parses so TCP mode can
    /// splice to port 443; HTTP mode rejects it at validation.
    pub fn parse(index: usize, address: &str) -> Result<Self, BackendError> {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(BackendError::Malformed("empty address".into()));
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };

        let base_url =
            Url::parse(&with_scheme).map_err(|e| BackendError::Malformed(e.to_string()))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(BackendError::UnsupportedScheme(base_url.scheme().to_string()));
        }

        let host = match base_url.host() {
            Some(url::Host::Ipv6(ip)) => format!("[{}]", ip),
            Some(host) => host.to_string(),
            None => return Err(BackendError::MissingHost),
        };
        let port = base_url
            .port_or_known_default()
            .ok_or_else(|| BackendError::MissingPort(base_url.scheme().to_string()))?;

        Ok(Self {
            index,
            address: trimmed.to_string(),
            dial_addr: format!("{}:{}", host, port),
            base_url,
        })
    }

    /// Parse a whole backend list, keeping configured order.
    pub fn parse_all<S: AsRef<str>>(addresses: &[S]) -> Result<Vec<Self>, BackendError> {
        addresses
            .iter()
            .enumerate()
            .map(|(i, a)| Self::parse(i, a.as_ref()))
            .collect()
    }

    /// Whether forwarding HTTP to this backend would need TLS.
    pub fn is_tls(&self) -> bool {
        self.base_url.scheme() == "https"
    }

    /// `host[:port]` authority for rewritten request URIs.
    pub fn authority(&self) -> String {
        match self.base_url.port() {
            Some(port) => format!("{}:{}", self.host(), port),
            None => self.host(),
        }
    }

    fn host(&self) -> String {
        match self.base_url.host() {
            Some(url::Host::Ipv6(ip)) => format!("[{}]", ip),
            Some(host) => host.to_string(),
            None => String::new(),
        }
    }

    /// URL for an HTTP health probe on `path`.
    pub fn probe_url(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}
