//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Unit of work (HTTP request / TCP connection)
//!     → pool.rs (healthy snapshot from the health checker)
//!     → Balancer::next() raw pick over the full backend list:
//!         - round_robin.rs (rotate through slots)
//!         - weighted.rs (batched quota per slot)
//!         - percentage.rs (random draw over cumulative percentages)
//!     → healthy[pick % healthy.len()]
//!     → backend.rs (resolved address)
//! ```
//!
//! # Design Decisions
//! - Strategies never look at health; the pool composes both
//! - Counters keep advancing over every slot, so a recovered backend
//!   rejoins rotation without special handling
//! - The algorithm set is closed, so it is an enum rather than a trait object

pub mod backend;
pub mod percentage;
pub mod pool;
pub mod round_robin;
pub mod weighted;

use thiserror::Error;

use crate::config::Algorithm;
use self::percentage::Percentage;
use self::round_robin::RoundRobin;
use self::weighted::Weighted;

pub use backend::{Backend, BackendError};
pub use pool::BackendPool;

/// Error type for balancer construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalancerError {
    #[error("balancer needs at least one backend")]
    NoBackends,

    #[error("{field} has {actual} entries but there are {expected} backends")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Backend slot selector.
#[derive(Debug)]
pub enum Balancer {
    RoundRobin(RoundRobin),
    Weighted(Weighted),
    Percentage(Percentage),
}

impl Balancer {
    /// Build the selector for `algorithm` over `backend_count` slots.
    ///
    /// Only the list the algorithm uses is checked against `backend_count`.
    pub fn new(
        algorithm: Algorithm,
        backend_count: usize,
        weights: &[u32],
        percentages: &[u32],
    ) -> Result<Self, BalancerError> {
        if backend_count == 0 {
            return Err(BalancerError::NoBackends);
        }

        let check = |field: &'static str, actual: usize| {
            if actual == backend_count {
                Ok(())
            } else {
                Err(BalancerError::LengthMismatch {
                    field,
                    expected: backend_count,
                    actual,
                })
            }
        };

        Ok(match algorithm {
            Algorithm::RoundRobin => Balancer::RoundRobin(RoundRobin::new(backend_count)),
            Algorithm::Weighted => {
                check("weights", weights.len())?;
                Balancer::Weighted(Weighted::new(weights.to_vec()))
            }
            Algorithm::Percentage => {
                check("percentages", percentages.len())?;
                Balancer::Percentage(Percentage::new(percentages.to_vec()))
            }
        })
    }

    /// Next raw pick in `[0, backend_count)`.
    pub fn next(&self) -> usize {
        match self {
            Balancer::RoundRobin(lb) => lb.next(),
            Balancer::Weighted(lb) => lb.next(),
            Balancer::Percentage(lb) => lb.next(),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Balancer::RoundRobin(_) => Algorithm::RoundRobin,
            Balancer::Weighted(_) => Algorithm::Weighted,
            Balancer::Percentage(_) => Algorithm::Percentage,
        }
    }
}
