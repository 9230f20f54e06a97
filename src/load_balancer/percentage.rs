//! Percentage-based random load balancing strategy.

use rand::Rng;

/// Percentage selector.
///
/// A uniform draw in `[0, 100)` lands in the cumulative partition of the
/// configured percentages. Draws past the end of the partition (when the
/// percentages sum below 100) go to the last backend.
#[derive(Debug, Clone)]
pub struct Percentage {
    percentages: Vec<u32>,
}

impl Percentage {
    /// `percentages` must be non-empty; `Balancer::new` checks it.
    pub fn new(percentages: Vec<u32>) -> Self {
        Self { percentages }
    }

    pub fn next(&self) -> usize {
        let draw = rand::thread_rng().gen_range(0..100);
        self.pick(draw)
    }

    /// Map a draw to a backend slot.
    pub fn pick(&self, draw: u32) -> usize {
        let mut sum = 0u32;
        for (i, pct) in self.percentages.iter().enumerate() {
            sum = sum.saturating_add(*pct);
            if draw < sum {
                return i;
            }
        }
        // TODO: the under-100 remainder silently skews toward the last backend;
        // revisit once the intended policy for short percentage lists is settled.
        self.percentages.len() - 1
    }
}
