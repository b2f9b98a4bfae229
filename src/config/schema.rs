//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the mock upstream.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the mock upstream server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Per-process upstream behaviour (identity, streaming cadence, limits).
    pub upstream: UpstreamSettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Settings fixed at startup and shared read-only by every request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamSettings {
    /// Identity of this process, compared against `expected-testupstream-id`.
    pub id: String,

    /// Delay before each streamed frame, in milliseconds.
    pub streaming_interval_ms: u64,

    /// Largest request body read when checking `expected-request-body`.
    pub max_body_size: usize,
}

impl UpstreamSettings {
    /// Streaming interval as a `Duration`.
    pub fn streaming_interval(&self) -> Duration {
        Duration::from_millis(self.streaming_interval_ms)
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            id: String::new(),
            streaming_interval_ms: 200,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = UpstreamConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.upstream.streaming_interval(), Duration::from_millis(200));
        assert!(config.upstream.id.is_empty());
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml() {
        let config: UpstreamConfig = toml::from_str(
            r#"
            [upstream]
            id = "primary"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.id, "primary");
        assert_eq!(config.upstream.streaming_interval_ms, 200);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
