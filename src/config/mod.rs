//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags / environment / TOML file
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → LbConfig (validated, immutable)
//!     → consumed once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the backend list never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{check_config, read_config, ConfigError};
pub use schema::{Algorithm, HealthCheckConfig, LbConfig, ObservabilityConfig, ProxyMode};
pub use validation::ValidationError;
