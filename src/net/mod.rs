//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! listener.rs (bind front address)
//!     → HTTP mode: hand the listener to axum (http::server)
//!     → TCP mode: proxy.rs accept loop
//!         → pool selection per connection
//!         → connection.rs (id + live session count)
//!         → splice client <-> backend
//! ```
//!
//! # Design Decisions
//! - Exactly one front listener per process
//! - A failed accept or dial only affects that one connection

pub mod connection;
pub mod listener;
pub mod proxy;

pub use proxy::TcpProxy;
