//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::MAX_TTL_SECONDS;

/// Default mirrored site
pub const DEFAULT_UPSTREAM_URL: &str = "https://nyaa.si";

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub server_host: String,
    /// HTTP server port
    pub server_port: u16,
    /// Redis connection URL; None selects the in-process store
    pub redis_url: Option<String>,
    /// Upper bound for a single store operation, in milliseconds
    pub store_timeout_ms: u64,
    /// Base URL of the mirrored site
    pub upstream_url: String,
    /// Upper bound for a single upstream request, in seconds
    pub upstream_timeout: u64,
    /// Lifetime of the cached help page, in seconds
    pub help_ttl: u64,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Interval between sweeps of the in-process store, in seconds
    pub cleanup_interval: u64,
    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_HOST` - Bind address (default: 127.0.0.1)
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `REDIS_URL` - Redis URL (default: unset, in-process store)
    /// - `STORE_TIMEOUT_MS` - Store operation bound (default: 1000)
    /// - `UPSTREAM_URL` - Mirrored site (default: https://nyaa.si)
    /// - `UPSTREAM_TIMEOUT` - Upstream request bound in seconds (default: 30)
    /// - `HELP_TTL` - Help page cache lifetime in seconds (default: 86400, out of range values fall back)
    /// - `STATIC_DIR` - Static file directory (default: static)
    /// - `CLEANUP_INTERVAL` - In-process store sweep frequency in seconds (default: 60)
    /// - `LOG_JSON` - JSON log output (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_host: string_var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parsed_var("SERVER_PORT").unwrap_or(defaults.server_port),
            redis_url: string_var("REDIS_URL"),
            store_timeout_ms: parsed_var("STORE_TIMEOUT_MS").unwrap_or(defaults.store_timeout_ms),
            upstream_url: string_var("UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            upstream_timeout: parsed_var("UPSTREAM_TIMEOUT").unwrap_or(defaults.upstream_timeout),
            help_ttl: parsed_var("HELP_TTL")
                .filter(|ttl| (1..=MAX_TTL_SECONDS).contains(ttl))
                .unwrap_or(defaults.help_ttl),
            static_dir: string_var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            cleanup_interval: parsed_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            log_json: parsed_var("LOG_JSON").unwrap_or(defaults.log_json),
        }
    }

    /// Store operation bound as a Duration.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Upstream request bound as a Duration.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }

    /// `host:port` the server listens on.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8000,
            redis_url: None,
            store_timeout_ms: 1000,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_timeout: 30,
            help_ttl: 86_400,
            static_dir: PathBuf::from("static"),
            cleanup_interval: 60,
            log_json: false,
        }
    }
}

/// Reads a variable, treating empty values as unset.
fn string_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Reads and parses a variable; unparseable values count as unset.
fn parsed_var<T: FromStr>(name: &str) -> Option<T> {
    string_var(name).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8000);
        assert!(config.redis_url.is_none());
        assert_eq!(config.store_timeout(), Duration::from_secs(1));
        assert_eq!(config.upstream_url, "https://nyaa.si");
        assert_eq!(config.help_ttl, 86_400);
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
        assert!(!config.log_json);
    }

    // All env mutations live in this single test; tests run in parallel.
    #[test]
    fn test_config_from_env() {
        env::remove_var("REDIS_URL");
        env::set_var("SERVER_PORT", "9090");
        env::set_var("HELP_TTL", "not-a-number");
        env::set_var("LOG_JSON", "true");
        env::set_var("STATIC_DIR", "  ");

        let config = Config::from_env();
        assert_eq!(config.server_port, 9090);
        assert_eq!(config.help_ttl, 86_400);
        assert!(config.log_json);
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert!(config.redis_url.is_none());

        env::set_var("REDIS_URL", "redis://cache.internal:6379/0");
        env::set_var("HELP_TTL", "0");
        let config = Config::from_env();
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache.internal:6379/0"));
        assert_eq!(config.help_ttl, 86_400);

        env::set_var("HELP_TTL", u64::MAX.to_string());
        assert_eq!(Config::from_env().help_ttl, 86_400);

        env::set_var("HELP_TTL", MAX_TTL_SECONDS.to_string());
        assert_eq!(Config::from_env().help_ttl, MAX_TTL_SECONDS);

        for name in ["REDIS_URL", "SERVER_PORT", "HELP_TTL", "LOG_JSON", "STATIC_DIR"] {
            env::remove_var(name);
        }
    }
}
