//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port for the admin API
    pub server_port: u16,
    /// Interval in seconds between background cleanup runs, 0 disables the task
    pub cleanup_interval: u64,
    /// TTL in seconds of the persisted statistics snapshot
    pub stats_ttl: u64,
    /// Extra seconds metadata records outlive their value in the store
    pub metadata_ttl_margin: u64,
    /// Window used to report expiring keys in statistics
    pub expiring_window_minutes: u64,
    /// Number of most accessed keys reported in statistics
    pub most_accessed_limit: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds, 0 = off (default: 0)
    /// - `STATS_TTL` - Stats snapshot TTL in seconds (default: 300)
    /// - `METADATA_TTL_MARGIN` - Metadata TTL margin in seconds (default: 60)
    /// - `EXPIRING_WINDOW_MINUTES` - Expiring keys window (default: 5)
    /// - `MOST_ACCESSED_LIMIT` - Most accessed keys reported (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            stats_ttl: env_or("STATS_TTL", defaults.stats_ttl),
            metadata_ttl_margin: env_or("METADATA_TTL_MARGIN", defaults.metadata_ttl_margin),
            expiring_window_minutes: env_or(
                "EXPIRING_WINDOW_MINUTES",
                defaults.expiring_window_minutes,
            ),
            most_accessed_limit: env_or("MOST_ACCESSED_LIMIT", defaults.most_accessed_limit),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 0,
            stats_ttl: 300,
            metadata_ttl_margin: 60,
            expiring_window_minutes: 5,
            most_accessed_limit: 10,
        }
    }
}
