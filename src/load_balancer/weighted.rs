//! Weighted round-robin load balancing strategy.
//!
//! Each backend's quota is consumed in one batch before moving on,
//! so weights `[2, 1, 3]` yield `0, 0, 1, 2, 2, 2` per cycle.

use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
struct Cursor {
    pos: usize,
    count: u32,
}

/// Weighted selector.
#[derive(Debug)]
pub struct Weighted {
    weights: Vec<u32>,
    cursor: Mutex<Cursor>,
}

impl Weighted {
    /// `weights` must be non-empty; `Balancer::new` checks it.
    pub fn new(weights: Vec<u32>) -> Self {
        Self {
            weights,
            cursor: Mutex::new(Cursor::default()),
        }
    }

    pub fn next(&self) -> usize {
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        let len = self.weights.len();

        if cursor.count < self.weights[cursor.pos] {
            cursor.count += 1;
            return cursor.pos;
        }

        // Quota used up: move to the next backend that has any weight at all.
        for _ in 0..len {
            cursor.pos = (cursor.pos + 1) % len;
            if self.weights[cursor.pos] > 0 {
                cursor.count = 1;
                return cursor.pos;
            }
        }

        // Every weight is zero. Still hand back a valid slot.
        cursor.count = 0;
        cursor.pos
    }
}
