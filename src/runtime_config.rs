//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the `wildroute` binary.
//!
//! ## Environment Variables
//!
//! ### `WILDROUTE_TABLE_CACHE`
//!
//! Path of a compiled route table. When set, commands load the sealed
//! registry from it and fall back to compiling the manifest when the cache is
//! missing, stale, or written by another format version.
//!
//! ### `WILDROUTE_HOT_RELOAD`
//!
//! Whether `wildroute watch` swaps in a rebuilt registry when the manifest
//! changes. `false`/`0`/`no`/`off` disable it. Default: `true`
//!
//! ### `WILDROUTE_SLOW_RESOLVE_US`
//!
//! Resolutions slower than this many microseconds are logged at WARN.
//! Accepts decimal or `0x`-prefixed hexadecimal. Default: `1000`
//!
//! ## Usage
//!
//! ```rust
//! use wildroute::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Slow resolve threshold: {:?}", config.slow_resolve);
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::router::DEFAULT_SLOW_RESOLVE;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub table_cache: Option<PathBuf>,
    pub hot_reload: bool,
    /// Threshold for slow-resolution warnings (default: 1 ms)
    pub slow_resolve: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            table_cache: None,
            hot_reload: true,
            slow_resolve: DEFAULT_SLOW_RESOLVE,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RuntimeConfig::default();
        let table_cache = lookup("WILDROUTE_TABLE_CACHE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let hot_reload = lookup("WILDROUTE_HOT_RELOAD")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(defaults.hot_reload);
        let slow_resolve = match lookup("WILDROUTE_SLOW_RESOLVE_US") {
            Some(val) => {
                let val = val.trim();
                let parsed = if let Some(hex) = val.strip_prefix("0x") {
                    u64::from_str_radix(hex, 16).ok()
                } else {
                    val.parse().ok()
                };
                parsed
                    .map(Duration::from_micros)
                    .unwrap_or(defaults.slow_resolve)
            }
            None => defaults.slow_resolve,
        };
        RuntimeConfig {
            table_cache,
            hot_reload,
            slow_resolve,
        }
    }
}
