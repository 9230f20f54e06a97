//! Load-balancing proxy library.
//!
//! A front listener spreads HTTP requests or raw TCP connections across a
//! static backend list, using round-robin, weighted or percentage selection
//! over whichever backends the health checker currently reports healthy.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod net;
pub mod observability;

pub use config::LbConfig;
pub use lifecycle::{run, Server, Shutdown};
