//! Raw TCP proxying.
//!
//! # Responsibilities
//! - Accept client connections on the front listener
//! - Pick a backend per connection through the pool
//! - Splice bytes in both directions until either side is done
//!
//! # Design Decisions
//! - Accept errors are logged and the loop keeps going
//! - No healthy backend: the client socket is dropped before any dial
//! - Each splice direction is its own task; when one ends the other is aborted
//!   and both sockets close, so no half-open session outlives its peer

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use crate::load_balancer::{Backend, BackendPool};
use crate::net::connection::{SessionGuard, SessionTracker};

const COPY_BUFFER_SIZE: usize = 8192;

/// TCP-mode proxy engine.
pub struct TcpProxy {
    pool: Arc<BackendPool>,
    sessions: SessionTracker,
}

impl TcpProxy {
    pub fn new(pool: Arc<BackendPool>) -> Self {
        Self {
            pool,
            sessions: SessionTracker::new(),
        }
    }

    /// Run the accept loop until the shutdown signal fires.
    pub async fn run(
        &self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "TCP proxy starting");

        loop {
            let (client, peer) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::error!(error = %e, "Accept error");
                        continue;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("TCP proxy received shutdown signal, no longer accepting");
                    break;
                }
            };

            let backend = match self.pool.select() {
                Some(b) => b.clone(),
                None => {
                    tracing::warn!(peer_addr = %peer, "No healthy backends, closing connection");
                    drop(client);
                    continue;
                }
            };

            let guard = self.sessions.open();
            tracing::debug!(
                session = %guard.id(),
                peer_addr = %peer,
                backend = %backend,
                "Forwarding new connection"
            );
            tokio::spawn(handle_connection(client, peer, backend, guard));
        }

        tracing::info!(
            active_sessions = self.sessions.active(),
            "TCP proxy stopped"
        );
        Ok(())
    }
}

async fn handle_connection(
    client: TcpStream,
    peer: SocketAddr,
    backend: Backend,
    guard: SessionGuard,
) {
    let upstream = match TcpStream::connect(&backend.dial_addr).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(
                session = %guard.id(),
                backend = %backend,
                error = %e,
                "Backend dial failed, closing client connection"
            );
            return;
        }
    };

    let _ = client.set_nodelay(true);
    let _ = upstream.set_nodelay(true);

    let stats = splice(client, upstream).await;
    tracing::debug!(
        session = %guard.id(),
        peer_addr = %peer,
        backend = %backend,
        bytes_to_backend = stats.client_to_backend,
        bytes_to_client = stats.backend_to_client,
        "Session closed"
    );
}

/// Bytes moved during one spliced session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpliceStats {
    pub client_to_backend: u64,
    pub backend_to_client: u64,
}

/// Copy bytes both ways until one direction finishes, then tear both down.
pub async fn splice(client: TcpStream, upstream: TcpStream) -> SpliceStats {
    let (client_read, client_write) = client.into_split();
    let (upstream_read, upstream_write) = upstream.into_split();

    let sent = Arc::new(AtomicU64::new(0));
    let received = Arc::new(AtomicU64::new(0));

    let mut to_backend = tokio::spawn(copy_half(client_read, upstream_write, sent.clone()));
    let mut to_client = tokio::spawn(copy_half(upstream_read, client_write, received.clone()));

    let finished = tokio::select! {
        res = &mut to_backend => (res, Direction::ToBackend),
        res = &mut to_client => (res, Direction::ToClient),
    };

    if let (Ok(Err(e)), direction) = &finished {
        tracing::trace!(error = %e, ?direction, "Splice direction ended with error");
    }

    let other = match finished.1 {
        Direction::ToBackend => to_client,
        Direction::ToClient => to_backend,
    };
    // Dropping the aborted task's halves closes both sockets.
    other.abort();
    let _ = other.await;

    SpliceStats {
        client_to_backend: sent.load(Ordering::Relaxed),
        backend_to_client: received.load(Ordering::Relaxed),
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    ToBackend,
    ToClient,
}

async fn copy_half(
    mut reader: OwnedReadHalf,
    mut writer: OwnedWriteHalf,
    counter: Arc<AtomicU64>,
) -> io::Result<()> {
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buffer[..n]).await?;
        counter.fetch_add(n as u64, Ordering::Relaxed);
    }
    writer.shutdown().await
}
