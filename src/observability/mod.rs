//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (startup summary, health transitions,
//!       accept/dial/proxy errors, no-healthy-backend rejections)
//!     → request spans carrying x-request-id (HTTP mode)
//!
//! Consumers:
//!     → logging.rs (fmt subscriber on stdout, EnvFilter)
//! ```

pub mod logging;
