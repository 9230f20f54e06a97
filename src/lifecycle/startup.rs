//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build backends, balancer, health checker and pool in dependency order
//! - Start the probe loops
//! - Hand the front listener to the HTTP or TCP engine and block serving
//!
//! # Design Decisions
//! - Fail fast: any configuration error is fatal before anything binds
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{check_config, ConfigError, LbConfig, ProxyMode};
use crate::health::{HealthChecker, Probe};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::load_balancer::{Backend, BackendError, BackendPool, Balancer, BalancerError};
use crate::net::listener::{self, ListenerError};
use crate::net::TcpProxy;

/// Errors that stop the proxy from starting or keep it from serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("balancer error: {0}")]
    Balancer(#[from] BalancerError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully wired load balancer waiting for its listener.
pub struct Server {
    config: LbConfig,
    pool: Arc<BackendPool>,
}

impl Server {
    /// Validate `config` and build every component. Nothing is spawned yet.
    pub fn new(config: LbConfig) -> Result<Self, StartupError> {
        check_config(&config)?;

        let backends: Arc<[Backend]> = Backend::parse_all(&config.backends)?.into();
        let balancer = Balancer::new(
            config.algorithm,
            backends.len(),
            &config.effective_weights(),
            &config.percentages,
        )?;

        let hc = &config.health_check;
        let probe = match config.mode {
            ProxyMode::Http => Probe::http(
                hc.normalized_path(),
                Duration::from_secs(hc.timeout_secs.max(1)),
            ),
            ProxyMode::Tcp => Probe::tcp(Duration::from_secs(hc.connect_timeout_secs.max(1))),
        };
        let health = Arc::new(HealthChecker::new(backends.clone(), hc.interval(), probe));
        let pool = Arc::new(BackendPool::new(backends, balancer, health));

        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &LbConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<BackendPool> {
        &self.pool
    }

    /// Start health checks and serve on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), StartupError> {
        let engine_shutdown = shutdown.subscribe();
        self.pool.health().start(shutdown);

        let local_addr = listener.local_addr()?;
        tracing::info!(
            front = %local_addr,
            backends = ?self.config.backends,
            algorithm = %self.config.algorithm,
            mode = %self.config.mode,
            health_path = %self.config.health_check.path,
            health_interval = ?self.pool.health().interval(),
            "Listening on {}, balancing to {:?} via {}",
            local_addr,
            self.config.backends,
            self.config.algorithm
        );

        match self.config.mode {
            ProxyMode::Http => {
                HttpServer::new(self.pool.clone())
                    .run(listener, engine_shutdown)
                    .await?
            }
            ProxyMode::Tcp => {
                TcpProxy::new(self.pool.clone())
                    .run(listener, engine_shutdown)
                    .await?
            }
        }

        Ok(())
    }
}

/// Validate, bind the configured front address and serve until `shutdown` fires.
pub async fn run(config: LbConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let server = Server::new(config)?;
    let listener = listener::bind(&server.config().front).await?;
    server.run(listener, &shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Algorithm;

    fn config(backends: &[&str]) -> LbConfig {
        LbConfig {
            front: "127.0.0.1:0".into(),
            backends: backends.iter().map(|b| b.to_string()).collect(),
            ..LbConfig::default()
        }
    }

    #[test]
    fn builds_from_valid_config() {
        let mut cfg = config(&["127.0.0.1:9001", "127.0.0.1:9002"]);
        cfg.algorithm = Algorithm::Weighted;
        cfg.weights = vec![2, 1];

        let server = Server::new(cfg).unwrap();
        assert_eq!(server.pool().backends().len(), 2);
        assert_eq!(server.pool().balancer().algorithm(), Algorithm::Weighted);
        assert_eq!(server.pool().health().healthy_indexes(), vec![0, 1]);
    }

    #[test]
    fn invalid_config_is_fatal() {
        let err = Server::new(config(&[])).err().unwrap();
        assert!(matches!(err, StartupError::Config(ConfigError::Validation(_))));

        let err = Server::new(config(&["https://secure.example"])).err().unwrap();
        assert!(matches!(err, StartupError::Config(_)));
    }

    #[test]
    fn tcp_mode_accepts_https_backend() {
        let mut cfg = config(&["https://secure.example"]);
        cfg.mode = ProxyMode::Tcp;
        let server = Server::new(cfg).unwrap();
        assert_eq!(server.pool().backends()[0].dial_addr, "secure.example:443");
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let shutdown = Shutdown::new();
        let task = tokio::spawn(run(config(&["127.0.0.1:9001"]), shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown.trigger();

        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
