//! Startup configuration.
//!
//! Everything here is resolved once in `main` and handed to constructors, so nothing reads the
//! process environment after the window opens.

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3001";
pub const DEFAULT_STALE_SECS: u64 = 5 * 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const API_URL_VAR: &str = "STORY_HUB_API_URL";
const STALE_SECS_VAR: &str = "STORY_HUB_STALE_SECS";
const TIMEOUT_SECS_VAR: &str = "STORY_HUB_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must start with http:// or https:// (got {value:?})")]
    InvalidUrl { var: &'static str, value: String },
    #[error("{var} must be a whole number of seconds (got {value:?})")]
    InvalidSeconds { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend base URL without a trailing slash.
    pub api_base_url: String,
    /// Freshness window for cached queries.
    pub stale_after: Duration,
    /// `None` disables the HTTP timeout entirely.
    pub request_timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            stale_after: Duration::from_secs(DEFAULT_STALE_SECS),
            request_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from an arbitrary variable source; unset variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_VAR) {
            config.api_base_url = parse_base_url(API_URL_VAR, &url)?;
        }

        if let Some(secs) = lookup(STALE_SECS_VAR) {
            config.stale_after = Duration::from_secs(parse_seconds(STALE_SECS_VAR, &secs)?);
        }

        if let Some(secs) = lookup(TIMEOUT_SECS_VAR) {
            config.request_timeout = match parse_seconds(TIMEOUT_SECS_VAR, &secs)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            };
        }

        Ok(config)
    }
}

fn parse_base_url(var: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl {
            var,
            value: value.to_string(),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn parse_seconds(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidSeconds {
            var,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_base_url, "http://localhost:3001");
        assert_eq!(config.stale_after, Duration::from_secs(300));
    }

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let config = config_from(&[(API_URL_VAR, "https://stories.example.com/api/")]).unwrap();
        assert_eq!(config.api_base_url, "https://stories.example.com/api");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = config_from(&[(API_URL_VAR, "ftp://stories")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn zero_timeout_disables_it() {
        let config = config_from(&[(TIMEOUT_SECS_VAR, "0"), (STALE_SECS_VAR, "30")]).unwrap();
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.stale_after, Duration::from_secs(30));
    }

    #[test]
    fn rejects_garbage_seconds() {
        let err = config_from(&[(STALE_SECS_VAR, "five minutes")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidSeconds {
                var: STALE_SECS_VAR,
                value: "five minutes".to_string()
            }
        );
    }
}
