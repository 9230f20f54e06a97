//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the load balancer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Interval used when `health_check.interval` cannot be parsed.
pub const FALLBACK_HEALTH_INTERVAL: Duration = Duration::from_secs(5);

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LbConfig {
    /// Front listen address (e.g., "0.0.0.0:8080").
    pub front: String,

    /// Ordered backend addresses, `host:port` or `http://host[:port][/path]`.
    pub backends: Vec<String>,

    /// Per-backend weights, used by the weighted algorithm only.
    /// Empty means every backend weighs 1.
    pub weights: Vec<u32>,

    /// Per-backend percentages, used by the percentage algorithm only.
    pub percentages: Vec<u32>,

    /// Selection algorithm.
    pub algorithm: Algorithm,

    /// Proxy mode.
    pub mode: ProxyMode,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for LbConfig {
    fn default() -> Self {
        Self {
            front: "0.0.0.0:8080".to_string(),
            backends: Vec::new(),
            weights: Vec::new(),
            percentages: Vec::new(),
            algorithm: Algorithm::default(),
            mode: ProxyMode::default(),
            health_check: HealthCheckConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl LbConfig {
    /// Weights with the "all ones" default applied.
    pub fn effective_weights(&self) -> Vec<u32> {
        if self.weights.is_empty() {
            vec![1; self.backends.len()]
        } else {
            self.weights.clone()
        }
    }
}

/// Backend selection algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    RoundRobin,
    Weighted,
    Percentage,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::RoundRobin => "roundrobin",
            Algorithm::Weighted => "weighted",
            Algorithm::Percentage => "percentage",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "roundrobin" => Ok(Algorithm::RoundRobin),
            "weighted" => Ok(Algorithm::Weighted),
            "percentage" => Ok(Algorithm::Percentage),
            other => Err(format!(
                "unknown algorithm '{}' (expected roundrobin|weighted|percentage)",
                other
            )),
        }
    }
}

/// Layer at which traffic is forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyMode {
    #[default]
    Http,
    Tcp,
}

impl fmt::Display for ProxyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyMode::Http => f.write_str("http"),
            ProxyMode::Tcp => f.write_str("tcp"),
        }
    }
}

impl FromStr for ProxyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(ProxyMode::Http),
            "tcp" => Ok(ProxyMode::Tcp),
            other => Err(format!("unknown proxy mode '{}' (expected http|tcp)", other)),
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Path to probe for HTTP health checks.
    pub path: String,

    /// Probe interval as a humantime duration string ("5s", "1m30s", "250ms").
    pub interval: String,

    /// HTTP probe timeout in seconds.
    pub timeout_secs: u64,

    /// TCP probe connect timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            interval: "5s".to_string(),
            timeout_secs: 5,
            connect_timeout_secs: 2,
        }
    }
}

impl HealthCheckConfig {
    /// Parsed probe interval, falling back to five seconds.
    pub fn interval(&self) -> Duration {
        match humantime::parse_duration(self.interval.trim()) {
            Ok(d) if !d.is_zero() => d,
            _ => {
                tracing::warn!(
                    interval = %self.interval,
                    fallback = ?FALLBACK_HEALTH_INTERVAL,
                    "Invalid health check interval, using fallback"
                );
                FALLBACK_HEALTH_INTERVAL
            }
        }
    }

    /// Normalized probe path, always starting with '/'.
    pub fn normalized_path(&self) -> String {
        if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Force debug logging for this crate.
    pub debug_log: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_log: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval_of(raw: &str) -> Duration {
        HealthCheckConfig {
            interval: raw.into(),
            ..HealthCheckConfig::default()
        }
        .interval()
    }

    #[test]
    fn parses_interval_strings() {
        assert_eq!(interval_of("5s"), Duration::from_secs(5));
        assert_eq!(interval_of("250ms"), Duration::from_millis(250));
        assert_eq!(interval_of("1m30s"), Duration::from_secs(90));
        assert_eq!(interval_of(" 2h "), Duration::from_secs(7200));
    }

    #[test]
    fn overflowing_interval_falls_back() {
        assert_eq!(interval_of("99999999999999999999h"), FALLBACK_HEALTH_INTERVAL);
        assert_eq!(interval_of("9999999999999999999h"), FALLBACK_HEALTH_INTERVAL);
    }

    #[test]
    fn interval_falls_back_to_five_seconds() {
        let mut hc = HealthCheckConfig::default();
        hc.interval = "soon".into();
        assert_eq!(hc.interval(), FALLBACK_HEALTH_INTERVAL);

        hc.interval = "10".into();
        assert_eq!(hc.interval(), FALLBACK_HEALTH_INTERVAL);

        hc.interval = "".into();
        assert_eq!(hc.interval(), FALLBACK_HEALTH_INTERVAL);

        hc.interval = "0s".into();
        assert_eq!(hc.interval(), FALLBACK_HEALTH_INTERVAL);

        hc.interval = "10s".into();
        assert_eq!(hc.interval(), Duration::from_secs(10));
    }

    #[test]
    fn algorithm_names() {
        assert_eq!("roundrobin".parse::<Algorithm>(), Ok(Algorithm::RoundRobin));
        assert_eq!("Weighted".parse::<Algorithm>(), Ok(Algorithm::Weighted));
        assert_eq!("percentage".parse::<Algorithm>(), Ok(Algorithm::Percentage));
        assert!("random".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::Weighted.to_string(), "weighted");
    }

    #[test]
    fn toml_round_trip_defaults() {
        let cfg: LbConfig = toml::from_str(
            r#"
            backends = ["127.0.0.1:9001", "http://127.0.0.1:9002/"]
            algorithm = "percentage"
            percentages = [70, 30]
            mode = "tcp"

            [health_check]
            interval = "2s"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.front, "0.0.0.0:8080");
        assert_eq!(cfg.algorithm, Algorithm::Percentage);
        assert_eq!(cfg.mode, ProxyMode::Tcp);
        assert_eq!(cfg.health_check.path, "/");
        assert_eq!(cfg.health_check.interval(), Duration::from_secs(2));
        assert_eq!(cfg.effective_weights(), vec![1, 1]);
    }
}
