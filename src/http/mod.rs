//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span)
//!     → pool selection (503 if nothing is healthy)
//!     → request.rs (URI rewrite, hop-by-hop strip, X-Forwarded-For)
//!     → hyper client round-trip (502 on transport failure)
//!     → response.rs (strip hop-by-hop, stream body back)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::HttpServer;
