//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of compilation units the cache can hold
    pub max_units: usize,
    /// Idle TTL in seconds for cached units, 0 disables expiration
    pub unit_ttl: u64,
    /// Maximum number of loads allowed to run concurrently
    pub max_concurrent_loads: usize,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_UNITS` - Maximum cached units (default: 64)
    /// - `UNIT_TTL` - Idle TTL in seconds, 0 disables (default: 1800)
    /// - `MAX_CONCURRENT_LOADS` - Concurrent load bound (default: 4)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            max_units: env::var("MAX_UNITS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(64),
            unit_ttl: env::var("UNIT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1800),
            max_concurrent_loads: env::var("MAX_CONCURRENT_LOADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }

    /// Returns the TTL as a `Duration`, or `None` when expiration is disabled.
    pub fn ttl(&self) -> Option<Duration> {
        if self.unit_ttl == 0 {
            None
        } else {
            Some(Duration::from_secs(self.unit_ttl))
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_units: 64,
            unit_ttl: 1800,
            max_concurrent_loads: 4,
            cleanup_interval: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_units, 64);
        assert_eq!(config.unit_ttl, 1800);
        assert_eq!(config.max_concurrent_loads, 4);
        assert_eq!(config.cleanup_interval, 60);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("MAX_UNITS");
        env::remove_var("UNIT_TTL");
        env::remove_var("MAX_CONCURRENT_LOADS");
        env::remove_var("CLEANUP_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.max_units, 64);
        assert_eq!(config.unit_ttl, 1800);
        assert_eq!(config.max_concurrent_loads, 4);
        assert_eq!(config.cleanup_interval, 60);
    }

    #[test]
    fn test_config_ttl_zero_disables_expiration() {
        let config = Config {
            unit_ttl: 0,
            ..Config::default()
        };
        assert!(config.ttl().is_none());
    }

    #[test]
    fn test_config_ttl_seconds() {
        let config = Config {
            unit_ttl: 90,
            ..Config::default()
        };
        assert_eq!(config.ttl(), Some(Duration::from_secs(90)));
    }
}
