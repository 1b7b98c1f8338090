//! Runtime configuration for the enricher.
//!
//! All settings come from environment variables; the two Dependency-Track
//! ones are required, everything else has a default.

use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;

use crate::shared::{EnrichmentError, Result};

const API_URL_VAR: &str = "DEPENDENCY_TRACK_API_URL";
const API_KEY_VAR: &str = "DEPENDENCY_TRACK_API_KEY";
const CACHE_PATH_VAR: &str = "CACHE_PATH";
const RETRY_MEMORY_PATH_VAR: &str = "RETRY_MEMORY_PATH";
const COOLDOWN_DAYS_VAR: &str = "ENRICHER_COOLDOWN_DAYS";
const FETCH_PERMITS_VAR: &str = "ENRICHER_FETCH_PERMITS";
const FETCH_SPACING_MS_VAR: &str = "ENRICHER_FETCH_SPACING_MS";

const DEFAULT_CACHE_PATH: &str = "license-cache.json";
const DEFAULT_RETRY_MEMORY_PATH: &str = "retry-memory.json";
const DEFAULT_COOLDOWN_DAYS: i64 = 30;
const DEFAULT_FETCH_PERMITS: usize = 4;
const DEFAULT_FETCH_SPACING_MS: u64 = 1000;

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct EnricherConfig {
    pub dependency_track_api_url: String,
    pub dependency_track_api_key: String,
    pub cache_path: PathBuf,
    pub retry_memory_path: PathBuf,
    pub fetch_cooldown: chrono::Duration,
    pub fetch_permits: usize,
    pub fetch_spacing: Duration,
}

impl EnricherConfig {
    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let dependency_track_api_url = required(&lookup, API_URL_VAR)?;
        let dependency_track_api_key = required(&lookup, API_KEY_VAR)?;

        let cache_path = lookup(CACHE_PATH_VAR)
            .unwrap_or_else(|| DEFAULT_CACHE_PATH.to_string())
            .into();
        let retry_memory_path = lookup(RETRY_MEMORY_PATH_VAR)
            .unwrap_or_else(|| DEFAULT_RETRY_MEMORY_PATH.to_string())
            .into();

        let cooldown_days = parse_or(&lookup, COOLDOWN_DAYS_VAR, DEFAULT_COOLDOWN_DAYS)?;
        if cooldown_days < 0 {
            return Err(EnrichmentError::Configuration {
                message: format!("{} must not be negative", COOLDOWN_DAYS_VAR),
            }
            .into());
        }

        let fetch_permits = parse_or(&lookup, FETCH_PERMITS_VAR, DEFAULT_FETCH_PERMITS)?;
        if fetch_permits == 0 {
            return Err(EnrichmentError::Configuration {
                message: format!("{} must be at least 1", FETCH_PERMITS_VAR),
            }
            .into());
        }

        let spacing_ms = parse_or(&lookup, FETCH_SPACING_MS_VAR, DEFAULT_FETCH_SPACING_MS)?;

        Ok(Self {
            dependency_track_api_url,
            dependency_track_api_key,
            cache_path,
            retry_memory_path,
            fetch_cooldown: chrono::Duration::days(cooldown_days),
            fetch_permits,
            fetch_spacing: Duration::from_millis(spacing_ms),
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(EnrichmentError::Configuration {
            message: format!("{} must be set", name),
        }
        .into()),
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid value for {}: {}", name, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_minimal_config_applies_defaults() {
        let config = EnricherConfig::from_lookup(lookup_from(&[
            (API_URL_VAR, "https://dtrack.example.org/api"),
            (API_KEY_VAR, "secret"),
        ]))
        .unwrap();

        assert_eq!(config.cache_path, PathBuf::from(DEFAULT_CACHE_PATH));
        assert_eq!(
            config.retry_memory_path,
            PathBuf::from(DEFAULT_RETRY_MEMORY_PATH)
        );
        assert_eq!(config.fetch_cooldown, chrono::Duration::days(30));
        assert_eq!(config.fetch_permits, 4);
        assert_eq!(config.fetch_spacing, Duration::from_millis(1000));
    }

    #[test]
    fn test_overrides_are_honored() {
        let config = EnricherConfig::from_lookup(lookup_from(&[
            (API_URL_VAR, "https://dtrack.example.org/api"),
            (API_KEY_VAR, "secret"),
            (CACHE_PATH_VAR, "/var/lib/enricher/cache.json"),
            (RETRY_MEMORY_PATH_VAR, "/var/lib/enricher/retry.json"),
            (COOLDOWN_DAYS_VAR, "7"),
            (FETCH_PERMITS_VAR, "2"),
            (FETCH_SPACING_MS_VAR, "250"),
        ]))
        .unwrap();

        assert_eq!(
            config.cache_path,
            PathBuf::from("/var/lib/enricher/cache.json")
        );
        assert_eq!(
            config.retry_memory_path,
            PathBuf::from("/var/lib/enricher/retry.json")
        );
        assert_eq!(config.fetch_cooldown, chrono::Duration::days(7));
        assert_eq!(config.fetch_permits, 2);
        assert_eq!(config.fetch_spacing, Duration::from_millis(250));
    }

    #[test]
    fn test_missing_api_url_is_an_error() {
        let result = EnricherConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "secret")]));
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains(API_URL_VAR));
    }

    #[test]
    fn test_blank_api_key_is_an_error() {
        let result = EnricherConfig::from_lookup(lookup_from(&[
            (API_URL_VAR, "https://dtrack.example.org/api"),
            (API_KEY_VAR, "   "),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unparseable_override_is_an_error() {
        let result = EnricherConfig::from_lookup(lookup_from(&[
            (API_URL_VAR, "https://dtrack.example.org/api"),
            (API_KEY_VAR, "secret"),
            (FETCH_PERMITS_VAR, "many"),
        ]));
        let err = format!("{:#}", result.unwrap_err());
        assert!(err.contains(FETCH_PERMITS_VAR));
    }

    #[test]
    fn test_zero_permits_rejected() {
        let result = EnricherConfig::from_lookup(lookup_from(&[
            (API_URL_VAR, "https://dtrack.example.org/api"),
            (API_KEY_VAR, "secret"),
            (FETCH_PERMITS_VAR, "0"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_cooldown_rejected() {
        let result = EnricherConfig::from_lookup(lookup_from(&[
            (API_URL_VAR, "https://dtrack.example.org/api"),
            (API_KEY_VAR, "secret"),
            (COOLDOWN_DAYS_VAR, "-1"),
        ]));
        assert!(result.is_err());
    }
}
