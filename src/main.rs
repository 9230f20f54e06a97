//! lb-proxy: a load-balancing proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                       LB-PROXY                        │
//!                     │                                                       │
//!   Client            │  ┌──────────┐   ┌──────────────┐   ┌──────────────┐  │
//!   ──────────────────┼─▶│ listener │──▶│ http::server │──▶│              │  │
//!                     │  │ (front)  │   │   or         │   │ BackendPool  │  │     Backend
//!                     │  └──────────┘   │ net::proxy   │──▶│   select()   │──┼───▶ servers
//!                     │                 └──────────────┘   └──────┬───────┘  │
//!                     │                                           │          │
//!                     │                      ┌────────────────────┴───────┐  │
//!                     │                      │ Balancer   │ HealthChecker │  │
//!                     │                      │ rr/wrr/pct │ probe loops   │◀─┼──── probes
//!                     │                      └────────────────────────────┘  │
//!                     └──────────────────────────────────────────────────────┘
//! ```
//!
//! Settings come from flags, `LB_*` environment variables or a TOML file,
//! in that order of precedence.

use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::PathBuf;

use lb_proxy::config::{read_config, Algorithm, LbConfig, ProxyMode};
use lb_proxy::lifecycle::{self, signals, Shutdown};
use lb_proxy::observability::logging;

#[derive(Debug, Parser)]
#[command(name = "lb-proxy")]
#[command(version)]
#[command(about = "HTTP / TCP load-balancing proxy with active health checks")]
struct Cli {
    /// Optional TOML config file; flags and env vars override it
    #[arg(short, long, env = "LB_CONFIG")]
    config: Option<PathBuf>,

    /// Front listen address (host:port)
    #[arg(long, env = "LB_FRONT")]
    front: Option<String>,

    /// Comma-separated backends (host:port or http://host[:port][/path])
    #[arg(long, env = "LB_BACKENDS", value_delimiter = ',')]
    backends: Vec<String>,

    /// Comma-separated weights for the weighted algorithm
    #[arg(long, env = "LB_WEIGHTS", value_delimiter = ',')]
    weights: Vec<u32>,

    /// Comma-separated percentages for the percentage algorithm
    #[arg(long, env = "LB_PERCENTAGES", value_delimiter = ',')]
    percentages: Vec<u32>,

    /// Algorithm: roundrobin|weighted|percentage
    #[arg(long = "algo", env = "LB_ALGO")]
    algorithm: Option<Algorithm>,

    /// Proxy mode: http or tcp
    #[arg(long, env = "LB_MODE")]
    mode: Option<ProxyMode>,

    /// Health check path (HTTP mode), e.g. /health
    #[arg(long, env = "LB_HEALTH_PATH")]
    health_path: Option<String>,

    /// Health check interval, e.g. 5s or 500ms
    #[arg(long, env = "LB_HEALTH_INTERVAL")]
    health_interval: Option<String>,

    /// Debug logging for the proxy itself (true|false|1|0|t|f)
    #[arg(long = "debuglog", env = "DEBUG_LOG", value_parser = BoolishValueParser::new())]
    debug_log: Option<bool>,

    /// Base log level (trace, debug, info, warn, error)
    #[arg(long, env = "LB_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    /// Layer flags and env vars over `config`.
    fn apply(self, config: &mut LbConfig) {
        if let Some(front) = self.front {
            config.front = front;
        }
        let backends: Vec<String> = self
            .backends
            .into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        if !backends.is_empty() {
            config.backends = backends;
        }
        if !self.weights.is_empty() {
            config.weights = self.weights;
        }
        if !self.percentages.is_empty() {
            config.percentages = self.percentages;
        }
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(path) = self.health_path {
            config.health_check.path = path;
        }
        if let Some(interval) = self.health_interval {
            config.health_check.interval = interval;
        }
        if let Some(debug_log) = self.debug_log {
            config.observability.debug_log = debug_log;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => LbConfig::default(),
    };
    cli.apply(&mut config);

    logging::init(&config.observability);
    tracing::info!("lb-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    tokio::spawn(signals::trigger_on_signal(shutdown.clone()));

    if let Err(e) = lifecycle::run(config, shutdown).await {
        tracing::error!(error = %e, "lb-proxy failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
