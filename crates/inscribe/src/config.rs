use std::{env, time::Duration};

const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// TTL for entries stored without one, in seconds (default: 600)
    pub cache_default_ttl_seconds: u64,
    /// How long a repository bypasses the cache after a fault (default: 300)
    pub cache_cooldown_seconds: u64,
    /// Interval between expired-entry sweeps, `0` disables (default: 60)
    pub cache_sweep_interval_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `CACHE_DEFAULT_TTL_SECONDS` - Fallback entry TTL (default: 600)
    /// - `CACHE_COOLDOWN_SECONDS` - Cache bypass window after a fault (default: 300)
    /// - `CACHE_SWEEP_INTERVAL_SECONDS` - Expired-entry sweep interval (default: 60)
    pub fn from_env() -> Self {
        Self {
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES")
                .filter(|max| *max > 0)
                .unwrap_or(DEFAULT_MAX_ENTRIES),
            cache_default_ttl_seconds: parse_var("CACHE_DEFAULT_TTL_SECONDS").unwrap_or(600),
            cache_cooldown_seconds: parse_var("CACHE_COOLDOWN_SECONDS").unwrap_or(300),
            cache_sweep_interval_seconds: parse_var("CACHE_SWEEP_INTERVAL_SECONDS").unwrap_or(60),
        }
    }

    /// Get the fallback entry TTL as a Duration.
    pub fn cache_default_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_default_ttl_seconds)
    }

    pub fn cache_cooldown(&self) -> Duration {
        Duration::from_secs(self.cache_cooldown_seconds)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
