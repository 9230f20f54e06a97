//! Front listener binding.
//!
//! # Responsibilities
//! - Resolve and bind the configured front address
//! - Report bind failures as a distinct, fatal error

use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Bind the front listener. Host names are resolved by tokio.
pub async fn bind(address: &str) -> Result<TcpListener, ListenerError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ListenerError::Bind {
            address: address.to_string(),
            source,
        })?;

    let local_addr: Option<SocketAddr> = listener.local_addr().ok();
    tracing::info!(address = ?local_addr, "Listener bound");

    Ok(listener)
}
