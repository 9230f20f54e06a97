//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check per-backend lists line up with the backend list
//! - Reject backend addresses the proxy cannot dial
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LbConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{Algorithm, LbConfig, ProxyMode};
use crate::load_balancer::backend::Backend;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("front address '{0}' is not a valid host:port")]
    InvalidFront(String),

    #[error("no backends configured")]
    NoBackends,

    #[error("backend #{index} '{address}': {reason}")]
    InvalidBackend {
        index: usize,
        address: String,
        reason: String,
    },

    #[error("{field} has {actual} entries but there are {expected} backends")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("backend #{index} '{address}': https needs TLS origination, which http mode does not do (tcp mode splices it as-is)")]
    TlsBackendInHttpMode { index: usize, address: String },

    #[error("all weights are zero")]
    AllWeightsZero,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &LbConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.front.parse::<SocketAddr>().is_err() && !looks_like_host_port(&config.front) {
        errors.push(ValidationError::InvalidFront(config.front.clone()));
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }

    for (index, address) in config.backends.iter().enumerate() {
        match Backend::parse(index, address) {
            Ok(backend) if backend.is_tls() && config.mode == ProxyMode::Http => {
                errors.push(ValidationError::TlsBackendInHttpMode {
                    index,
                    address: address.clone(),
                });
            }
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::InvalidBackend {
                index,
                address: address.clone(),
                reason: e.to_string(),
            }),
        }
    }

    let expected = config.backends.len();
    match config.algorithm {
        Algorithm::RoundRobin => {}
        Algorithm::Weighted => {
            let weights = config.effective_weights();
            if weights.len() != expected {
                errors.push(ValidationError::LengthMismatch {
                    field: "weights",
                    expected,
                    actual: weights.len(),
                });
            } else if expected > 0 && weights.iter().all(|w| *w == 0) {
                errors.push(ValidationError::AllWeightsZero);
            }
        }
        Algorithm::Percentage => {
            if config.percentages.len() != expected {
                errors.push(ValidationError::LengthMismatch {
                    field: "percentages",
                    expected,
                    actual: config.percentages.len(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn looks_like_host_port(addr: &str) -> bool {
    match addr.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}
