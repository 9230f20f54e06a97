//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Round-robin selector.
/// Stores an internal counter to rotate through backend slots.
#[derive(Debug)]
pub struct RoundRobin {
    counter: AtomicUsize,
    len: usize,
}

impl RoundRobin {
    /// `len` must be non-zero; `Balancer::new` checks it.
    pub fn new(len: usize) -> Self {
        Self {
            counter: AtomicUsize::new(0),
            len,
        }
    }

    pub fn next(&self) -> usize {
        // fetch_add wraps on overflow, so the result stays in range forever.
        self.counter.fetch_add(1, Ordering::Relaxed) % self.len
    }
}
