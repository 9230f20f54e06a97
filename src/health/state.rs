//! Backend health state transitions.
//!
//! # States
//! - Healthy: backend receives traffic
//! - Unhealthy: backend excluded from selection
//!
//! # State Transitions
//! ```text
//! Healthy → Unhealthy: a probe fails
//! Unhealthy → Healthy: a probe succeeds
//! ```
//!
//! Every backend starts Healthy. Only edges are reported, so a backend that
//! keeps failing logs once rather than once per probe.

/// A change in a backend's health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    BecameHealthy,
    BecameUnhealthy,
}

/// Remembers the previous probe result of one backend.
#[derive(Debug, Clone)]
pub struct TransitionTracker {
    previous: bool,
}

impl TransitionTracker {
    pub fn new() -> Self {
        Self { previous: true }
    }

    /// Record a probe result; returns the transition if the state flipped.
    pub fn observe(&mut self, healthy: bool) -> Option<Transition> {
        if healthy == self.previous {
            return None;
        }
        self.previous = healthy;
        Some(if healthy {
            Transition::BecameHealthy
        } else {
            Transition::BecameUnhealthy
        })
    }
}

impl Default for TransitionTracker {
    fn default() -> Self {
        Self::new()
    }
}
