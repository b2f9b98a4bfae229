//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::UpstreamConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the process identity.
pub const ENV_UPSTREAM_ID: &str = "TESTUPSTREAM_ID";

/// Environment variable overriding the streaming interval (e.g. `50ms`).
pub const ENV_STREAMING_INTERVAL: &str = "STREAMING_INTERVAL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides from the process environment, and validate.
pub fn load_config(path: Option<&Path>) -> Result<UpstreamConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => UpstreamConfig::default(),
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `TESTUPSTREAM_ID` and `STREAMING_INTERVAL` from `lookup`.
pub fn apply_env_overrides<F>(mut config: UpstreamConfig, lookup: F) -> Result<UpstreamConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(id) = lookup(ENV_UPSTREAM_ID) {
        config.upstream.id = id;
    }

    if let Some(raw) = lookup(ENV_STREAMING_INTERVAL) {
        let interval = humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::Env {
            var: ENV_STREAMING_INTERVAL,
            reason: format!("{raw:?}: {e}"),
        })?;
        if interval.subsec_nanos() % 1_000_000 != 0 {
            return Err(ConfigError::Env {
                var: ENV_STREAMING_INTERVAL,
                reason: format!("{raw:?} is not a whole number of milliseconds"),
            });
        }
        config.upstream.streaming_interval_ms = interval.as_millis() as u64;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let config = apply_env_overrides(
            UpstreamConfig::default(),
            env(&[(ENV_UPSTREAM_ID, "blue"), (ENV_STREAMING_INTERVAL, "50ms")]),
        )
        .unwrap();

        assert_eq!(config.upstream.id, "blue");
        assert_eq!(config.upstream.streaming_interval_ms, 50);
    }

    #[test]
    fn test_no_env_keeps_defaults() {
        let config = apply_env_overrides(UpstreamConfig::default(), env(&[])).unwrap();
        assert_eq!(config.upstream.id, "");
        assert_eq!(config.upstream.streaming_interval_ms, 200);
    }

    #[test]
    fn test_bad_interval_is_rejected() {
        let err = apply_env_overrides(
            UpstreamConfig::default(),
            env(&[(ENV_STREAMING_INTERVAL, "soon")]),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Invalid STREAMING_INTERVAL"));
    }

    #[test]
    fn test_sub_millisecond_interval_is_rejected() {
        for raw in ["500us", "1500us"] {
            let err = apply_env_overrides(
                UpstreamConfig::default(),
                env(&[(ENV_STREAMING_INTERVAL, raw)]),
            )
            .unwrap_err();
            assert!(err.to_string().contains("whole number of milliseconds"), "{raw}");
        }

        let config = apply_env_overrides(
            UpstreamConfig::default(),
            env(&[(ENV_STREAMING_INTERVAL, "0ms")]),
        )
        .unwrap();
        assert_eq!(config.upstream.streaming_interval_ms, 0);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/testupstream.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
