//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Pick the filter from `RUST_LOG`, falling back to the configured level
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `debug_log` raises this crate to debug without touching dependencies

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(config: &ObservabilityConfig) -> String {
    let crate_level = if config.debug_log {
        "debug"
    } else {
        config.log_level.as_str()
    };
    format!("lb_proxy={},tower_http={}", crate_level, config.log_level)
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_raises_crate_level_only() {
        let mut cfg = ObservabilityConfig::default();
        assert_eq!(default_directives(&cfg), "lb_proxy=info,tower_http=info");

        cfg.debug_log = true;
        assert_eq!(default_directives(&cfg), "lb_proxy=debug,tower_http=info");
    }

    #[test]
    fn init_twice_is_harmless() {
        let cfg = ObservabilityConfig::default();
        init(&cfg);
        init(&cfg);
    }
}
