//! Runtime configuration
//!
//! Read from `PETCARE_*` environment variables; the binary also loads a
//! `.env` file first. Unset variables fall back to defaults, malformed ones
//! are an error.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::api::client::DEFAULT_TIMEOUT;
use crate::pagination::cache::DEFAULT_CACHE_TTL;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_STORAGE_PATH: &str = "petcare_storage.json";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not valid: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub storage_path: PathBuf,
    pub listen_addr: SocketAddr,
    pub cache_ttl: Duration,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cache_ttl: DEFAULT_CACHE_TTL,
            http_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let listen_addr = match var("PETCARE_LISTEN_ADDR") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "PETCARE_LISTEN_ADDR",
                value,
            })?,
            None => defaults.listen_addr,
        };

        Ok(Self {
            api_url: var("PETCARE_API_URL").unwrap_or(defaults.api_url),
            api_token: var("PETCARE_API_TOKEN"),
            storage_path: var("PETCARE_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            listen_addr,
            cache_ttl: parse_secs(var("PETCARE_CACHE_TTL_SECS"), "PETCARE_CACHE_TTL_SECS")?
                .unwrap_or(defaults.cache_ttl),
            http_timeout: parse_secs(
                var("PETCARE_HTTP_TIMEOUT_SECS"),
                "PETCARE_HTTP_TIMEOUT_SECS",
            )?
            .unwrap_or(defaults.http_timeout),
        })
    }
}

fn parse_secs(value: Option<String>, name: &'static str) -> Result<Option<Duration>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid { name, value: v })
        })
        .transpose()
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
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PETCARE_API_URL", "https://api.petcare.example/v1"),
            ("PETCARE_API_TOKEN", "secret"),
            ("PETCARE_LISTEN_ADDR", "0.0.0.0:9000"),
            ("PETCARE_CACHE_TTL_SECS", "60"),
            ("PETCARE_STORAGE_PATH", "/tmp/cart.json"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://api.petcare.example/v1");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.storage_path, PathBuf::from("/tmp/cart.json"));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = Config::from_lookup(lookup(&[("PETCARE_CACHE_TTL_SECS", "five")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "PETCARE_CACHE_TTL_SECS",
                value: "five".into()
            }
        );

        assert!(Config::from_lookup(lookup(&[("PETCARE_LISTEN_ADDR", "nowhere")])).is_err());
    }
}
