//! Backend pool management.
//!
//! # Responsibilities
//! - Own the ordered backend list shared with the health checker
//! - Compose the healthy snapshot with the balancer's raw pick

use std::sync::Arc;

use crate::health::HealthChecker;
use crate::load_balancer::{backend::Backend, Balancer};

/// Backends plus the selection state used to pick among them.
#[derive(Debug)]
pub struct BackendPool {
    backends: Arc<[Backend]>,
    balancer: Balancer,
    health: Arc<HealthChecker>,
}

impl BackendPool {
    pub fn new(backends: Arc<[Backend]>, balancer: Balancer, health: Arc<HealthChecker>) -> Self {
        Self {
            backends,
            balancer,
            health,
        }
    }

    /// Select a backend for one unit of work.
    /// Returns `None` when no backend is currently healthy.
    pub fn select(&self) -> Option<&Backend> {
        let healthy = self.health.healthy_indexes();
        if healthy.is_empty() {
            tracing::debug!(backend_count = self.backends.len(), "No healthy backends");
            return None;
        }

        let pick = self.balancer.next();
        let chosen = healthy[pick % healthy.len()];
        self.backends.get(chosen)
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    pub fn balancer(&self) -> &Balancer {
        &self.balancer
    }

    pub fn health(&self) -> &Arc<HealthChecker> {
        &self.health
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Algorithm;
    use crate::health::Probe;
    use std::time::Duration;

    fn pool(n: usize) -> BackendPool {
        let addrs: Vec<String> = (0..n).map(|i| format!("127.0.0.1:{}", 9000 + i)).collect();
        let backends: Arc<[Backend]> = Backend::parse_all(&addrs).unwrap().into();
        let health = Arc::new(HealthChecker::new(
            backends.clone(),
            Duration::from_secs(60),
            Probe::tcp(Duration::from_secs(2)),
        ));
        let balancer = Balancer::new(Algorithm::RoundRobin, n, &[], &[]).unwrap();
        BackendPool::new(backends, balancer, health)
    }

    #[test]
    fn all_healthy_follows_balancer() {
        let pool = pool(3);
        let picks: Vec<usize> = (0..6).map(|_| pool.select().unwrap().index).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn unhealthy_backend_is_never_selected_and_rejoins() {
        let pool = pool(3);
        pool.health().record(1, false);

        for _ in 0..1_000 {
            assert_ne!(pool.select().unwrap().index, 1);
        }

        pool.health().record(1, true);
        let seen: Vec<usize> = (0..3).map(|_| pool.select().unwrap().index).collect();
        assert!(seen.contains(&1), "recovered backend should rejoin: {:?}", seen);
    }

    #[test]
    fn none_when_everything_is_down() {
        let pool = pool(2);
        pool.health().record(0, false);
        pool.health().record(1, false);
        assert!(pool.select().is_none());

        pool.health().record(0, true);
        assert_eq!(pool.select().unwrap().index, 0);
    }
}
