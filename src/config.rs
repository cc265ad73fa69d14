//! Runtime configuration loaded from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `EPIWATCH_API_BASE` | `https://disease.sh/v3` |
//! | `EPIWATCH_PORT` | `3000` |
//! | `EPIWATCH_HTTP_TIMEOUT_SECS` | `10` |
//! | `EPIWATCH_TOP_N` | `5` |
//!
//! Malformed values fall back to the default.

use std::env;
use std::time::Duration;

use crate::aggregation::DEFAULT_TOP_N;
use crate::data_sources::disease_sh::DISEASE_SH_BASE;

/// Default port if not specified via environment variable.
pub const DEFAULT_PORT: u16 = 3000;

/// Default upstream request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the upstream statistics API.
    pub api_base: String,
    pub port: u16,
    pub http_timeout: Duration,
    pub top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DISEASE_SH_BASE.to_string(),
            port: DEFAULT_PORT,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();

        let api_base = lookup("EPIWATCH_API_BASE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_base);

        let port = lookup("EPIWATCH_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let http_timeout = lookup("EPIWATCH_HTTP_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&s| s > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        let top_n = lookup("EPIWATCH_TOP_N")
            .and_then(|n| n.parse().ok())
            .unwrap_or(defaults.top_n);

        Self {
            api_base,
            port,
            http_timeout,
            top_n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = Config::from_lookup(lookup(&[
            ("EPIWATCH_API_BASE", "http://localhost:8080/v3"),
            ("EPIWATCH_PORT", "8088"),
            ("EPIWATCH_HTTP_TIMEOUT_SECS", "3"),
            ("EPIWATCH_TOP_N", "10"),
        ]));

        assert_eq!(config.api_base, "http://localhost:8080/v3");
        assert_eq!(config.port, 8088);
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.top_n, 10);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("EPIWATCH_API_BASE", "   "),
            ("EPIWATCH_PORT", "eighty"),
            ("EPIWATCH_HTTP_TIMEOUT_SECS", "0"),
            ("EPIWATCH_TOP_N", "-1"),
        ]));

        assert_eq!(config, Config::default());
    }
}
