//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::DEFAULT_TTL_MS;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Lifetime of a durable cache record in milliseconds
    pub ttl_ms: u64,
    /// Path of the durable store document, None = in-memory store
    pub storage_path: Option<PathBuf>,
    /// HTTP server port
    pub server_port: u16,
    /// Seconds between background sweeps, 0 = no background sweep
    pub sweep_interval: u64,
    /// Run one sweep before serving requests
    pub sweep_on_startup: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - Record lifetime in milliseconds (default: 7 days)
    /// - `CACHE_STORAGE_PATH` - Durable store file (default: unset, in-memory)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Background sweep frequency in seconds (default: 0, disabled)
    /// - `SWEEP_ON_STARTUP` - Sweep once at startup (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_ms: parse_var("CACHE_TTL_MS").unwrap_or(defaults.ttl_ms),
            storage_path: env::var("CACHE_STORAGE_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            sweep_interval: parse_var("SWEEP_INTERVAL").unwrap_or(defaults.sweep_interval),
            sweep_on_startup: parse_var("SWEEP_ON_STARTUP").unwrap_or(defaults.sweep_on_startup),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            storage_path: None,
            server_port: 3000,
            sweep_interval: 0,
            sweep_on_startup: true,
        }
    }
}
