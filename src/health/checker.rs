//! Active health checking.
//!
//! # Responsibilities
//! - Own the health status table (one flag per backend)
//! - Run one independent probe loop per backend
//! - Serve healthy snapshots to the forwarding path

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::health::probe::Probe;
use crate::health::state::{Transition, TransitionTracker};
use crate::lifecycle::Shutdown;
use crate::load_balancer::Backend;

/// Health status table plus the probe loops that keep it current.
#[derive(Debug)]
pub struct HealthChecker {
    backends: Arc<[Backend]>,
    /// Index → healthy. Every backend starts healthy.
    status: RwLock<Vec<bool>>,
    interval: Duration,
    probe: Probe,
}

impl HealthChecker {
    pub fn new(backends: Arc<[Backend]>, interval: Duration, probe: Probe) -> Self {
        let status = RwLock::new(vec![true; backends.len()]);
        Self {
            backends,
            status,
            interval,
            probe,
        }
    }

    /// Spawn one probe loop per backend and return immediately.
    ///
    /// Meant to be called once; each call spawns another full set of loops.
    pub fn start(self: &Arc<Self>, shutdown: &Shutdown) -> Vec<JoinHandle<()>> {
        tracing::info!(
            backends = self.backends.len(),
            interval = ?self.interval,
            probe = self.probe_kind(),
            "Health checker starting"
        );

        (0..self.backends.len())
            .map(|index| {
                let checker = Arc::clone(self);
                let rx = shutdown.subscribe();
                tokio::spawn(async move { checker.probe_loop(index, rx).await })
            })
            .collect()
    }

    async fn probe_loop(self: Arc<Self>, index: usize, mut shutdown: broadcast::Receiver<()>) {
        let backend = &self.backends[index];
        let mut tracker = TransitionTracker::new();

        loop {
            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = shutdown.recv() => {
                    tracing::debug!(backend = %backend, "Probe loop received shutdown signal, exiting");
                    break;
                }
            }

            let healthy = self.probe.check(backend).await;
            self.record(index, healthy);

            match tracker.observe(healthy) {
                Some(Transition::BecameHealthy) => {
                    tracing::info!(backend = %backend, "Backend {} is now healthy", backend);
                }
                Some(Transition::BecameUnhealthy) => {
                    tracing::warn!(backend = %backend, "Backend {} is now UNHEALTHY", backend);
                }
                None => {}
            }
        }
    }

    /// Store one probe result. The write lock covers this single entry update only.
    pub(crate) fn record(&self, index: usize, healthy: bool) {
        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = status.get_mut(index) {
            *slot = healthy;
        }
    }

    /// Indexes currently marked healthy, in ascending order.
    pub fn healthy_indexes(&self) -> Vec<usize> {
        let status = self.status.read().unwrap_or_else(PoisonError::into_inner);
        status
            .iter()
            .enumerate()
            .filter_map(|(i, ok)| ok.then_some(i))
            .collect()
    }

    pub fn is_healthy(&self, index: usize) -> bool {
        let status = self.status.read().unwrap_or_else(PoisonError::into_inner);
        status.get(index).copied().unwrap_or(false)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    fn probe_kind(&self) -> &'static str {
        match self.probe {
            Probe::Http(_) => "http",
            Probe::Tcp(_) => "tcp",
        }
    }
}
