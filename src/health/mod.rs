//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! checker.rs (one loop per backend):
//!     sleep(interval)
//!     → probe.rs (HTTP GET or TCP connect)
//!     → write status table entry
//!     → state.rs (log on edges only)
//!
//! Forwarding path:
//!     → checker.healthy_indexes() snapshot under a read lock
//! ```
//!
//! # Design Decisions
//! - The status table is private to the checker; only its loops write to it
//! - Backends start healthy and stay in rotation until a probe says otherwise
//! - Constant interval, no backoff, no thresholds

pub mod checker;
pub mod probe;
pub mod state;

pub use checker::HealthChecker;
pub use probe::Probe;
