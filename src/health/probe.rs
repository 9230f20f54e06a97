//! Liveness probes.
//!
//! # Design Decisions
//! - HTTP: healthy means a response arrived with status < 500
//! - TCP: healthy means the connect completed; the socket is closed at once
//! - Every probe is bounded by a timeout; an expired timeout is a failure

use axum::body::Body;
use axum::http::Request;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::fmt;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time;

use crate::load_balancer::Backend;

/// Probe flavour, chosen once from the proxy mode.
#[derive(Debug, Clone)]
pub enum Probe {
    Http(HttpProbe),
    Tcp(TcpProbe),
}

impl Probe {
    pub fn http(path: impl Into<String>, timeout: Duration) -> Self {
        Probe::Http(HttpProbe::new(path.into(), timeout))
    }

    pub fn tcp(timeout: Duration) -> Self {
        Probe::Tcp(TcpProbe { timeout })
    }

    /// Run one probe against `backend`.
    pub async fn check(&self, backend: &Backend) -> bool {
        match self {
            Probe::Http(p) => p.check(backend).await,
            Probe::Tcp(p) => p.check(backend).await,
        }
    }
}

/// GET `<backend><path>` and look at the status code.
#[derive(Clone)]
pub struct HttpProbe {
    client: Client<HttpConnector, Body>,
    path: String,
    timeout: Duration,
}

impl HttpProbe {
    fn new(path: String, timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self {
            client,
            path,
            timeout,
        }
    }

    async fn check(&self, backend: &Backend) -> bool {
        let uri = backend.probe_url(&self.path);
        let request = match Request::builder()
            .method("GET")
            .uri(&uri)
            .header("user-agent", "lb-proxy-health-check")
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(uri = %uri, error = %e, "Failed to build health check request");
                return false;
            }
        };

        // The response (and its body) is dropped unread, which releases the connection.
        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let status = response.status();
                tracing::trace!(backend = %backend, status = %status, "Health probe response");
                status.as_u16() < 500
            }
            Ok(Err(e)) => {
                tracing::debug!(backend = %backend, error = %e, "Health probe failed: connection error");
                false
            }
            Err(_) => {
                tracing::debug!(backend = %backend, "Health probe failed: timeout");
                false
            }
        }
    }
}

impl fmt::Debug for HttpProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpProbe")
            .field("path", &self.path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Bounded raw connect.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    async fn check(&self, backend: &Backend) -> bool {
        match time::timeout(self.timeout, TcpStream::connect(&backend.dial_addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                true
            }
            Ok(Err(e)) => {
                tracing::debug!(backend = %backend, error = %e, "TCP probe failed");
                false
            }
            Err(_) => {
                tracing::debug!(backend = %backend, "TCP probe failed: timeout");
                false
            }
        }
    }
}
