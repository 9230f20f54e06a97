//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Build balancer + health checker → Start probes → Serve
//!
//! Shutdown (shutdown.rs):
//!     Trigger → probe loops exit → accept loop / axum stop → run() returns
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listeners
//! - Without a trigger every loop runs until the process exits

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{run, Server, StartupError};
