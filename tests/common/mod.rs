//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use lb_proxy::{LbConfig, Server, Shutdown};

/// Switch a mock backend between serving and failing.
#[derive(Clone)]
pub struct Toggle(Arc<AtomicBool>);

impl Toggle {
    pub fn set_up(&self, up: bool) {
        self.0.store(up, Ordering::SeqCst);
    }

    fn is_up(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Start a mock HTTP backend on an ephemeral port that answers every request
/// with `200` and `name` as the body.
pub async fn start_mock_backend(name: &'static str) -> SocketAddr {
    let (addr, _) = start_toggled_backend(name).await;
    addr
}

/// Like [`start_mock_backend`], but answers `500` while the toggle is down.
pub async fn start_toggled_backend(name: &'static str) -> (SocketAddr, Toggle) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let toggle = Toggle(Arc::new(AtomicBool::new(true)));
    let state = toggle.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let state = state.clone();
                    tokio::spawn(async move {
                        // Read the request head; bodies are not used by these tests.
                        let mut buf = vec![0u8; 4096];
                        let mut read = 0;
                        loop {
                            match socket.read(&mut buf[read..]).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => read += n,
                            }
                            if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") || read == buf.len() {
                                break;
                            }
                        }

                        let (status, body) = if state.is_up() {
                            ("200 OK", name)
                        } else {
                            ("500 Internal Server Error", "down")
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, toggle)
}

/// Start a TCP backend that writes `greeting` on connect, then echoes.
pub async fn start_tcp_backend(greeting: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        if socket.write_all(greeting.as_bytes()).await.is_err() {
                            return;
                        }
                        let mut buf = [0u8; 1024];
                        loop {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => {
                                    if socket.write_all(&buf[..n]).await.is_err() {
                                        break;
                                    }
                                }
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Build a config for `backends` with a fast health interval.
pub fn config(backends: &[SocketAddr]) -> LbConfig {
    let mut config = LbConfig {
        front: "127.0.0.1:0".into(),
        backends: backends.iter().map(|a| a.to_string()).collect(),
        ..LbConfig::default()
    };
    config.health_check.interval = "100ms".into();
    config.health_check.timeout_secs = 1;
    config.health_check.connect_timeout_secs = 1;
    config
}

/// Start the proxy on an ephemeral port. Trigger the returned `Shutdown` to stop it.
pub async fn start_proxy(config: LbConfig) -> (SocketAddr, Shutdown) {
    let server = Server::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let handle = shutdown.clone();

    tokio::spawn(async move {
        let _ = server.run(listener, &handle).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
