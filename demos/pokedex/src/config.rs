//! Application configuration.
//!
//! | Variable                       | Default                      |
//! |--------------------------------|------------------------------|
//! | `POKEAPI_URL`                  | `https://pokeapi.co/api/v2`  |
//! | `API_URL`                      | `http://localhost:3000`      |
//! | `POKEDEX_TOKENS_FILE`          | unset (no backend requests)  |
//! | `POKEDEX_ASYNC_WORK_MS`        | `3000`                       |
//! | `POKEDEX_REQUEST_TIMEOUT_SECS` | `30`                         |
//! | `POKEDEX_LOG_LEVEL`            | `info`                       |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Public Pokemon API
pub const DEFAULT_POKEAPI_URL: &str = "https://pokeapi.co/api/v2";

/// Authenticated backend issuing and refreshing tokens
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base url of the Pokemon API
    pub pokeapi_url: String,
    /// Base url of the authenticated backend
    pub api_url: String,
    /// Where backend tokens are stored; backend requests are refused when unset
    pub tokens_file: Option<PathBuf>,
    /// Duration of the counter's async work
    pub async_work: Duration,
    /// Default HTTP request timeout
    pub request_timeout: Duration,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pokeapi_url: DEFAULT_POKEAPI_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            tokens_file: None,
            async_work: Duration::from_millis(3000),
            request_timeout: Duration::from_secs(30),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            pokeapi_url: lookup("POKEAPI_URL").unwrap_or(defaults.pokeapi_url),
            api_url: lookup("API_URL").unwrap_or(defaults.api_url),
            tokens_file: lookup("POKEDEX_TOKENS_FILE")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            async_work: lookup("POKEDEX_ASYNC_WORK_MS")
                .and_then(|s| s.parse().ok())
                .map_or(defaults.async_work, Duration::from_millis),
            request_timeout: lookup("POKEDEX_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map_or(defaults.request_timeout, Duration::from_secs),
            log_level: lookup("POKEDEX_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
    }

    #[test]
    fn variables_override_defaults() {
        let vars: HashMap<&str, &str> = [
            ("POKEAPI_URL", "http://localhost:8080/api/v2"),
            ("POKEDEX_TOKENS_FILE", "/tmp/tokens.json"),
            ("POKEDEX_ASYNC_WORK_MS", "250"),
            ("POKEDEX_REQUEST_TIMEOUT_SECS", "not a number"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.pokeapi_url, "http://localhost:8080/api/v2");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.tokens_file, Some(PathBuf::from("/tmp/tokens.json")));
        assert_eq!(config.async_work, Duration::from_millis(250));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
