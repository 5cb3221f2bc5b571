//! Configuration for the Prometheus exporter.

use rubrik_common::{ClusterConfig, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete exporter configuration.
///
/// Credentials are not part of the file; they come from the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Cluster API settings.
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Prometheus exporter settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,

    /// Polling settings.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Prometheus HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrometheusConfig {
    /// Address to listen on (default: "0.0.0.0:9477").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path for metrics endpoint (default: "/metrics").
    #[serde(default = "default_path")]
    pub path: String,

    /// Metric name prefix (default: none). With "rubrik" the gauges are
    /// exported as `rubrik_total_storage_bytes` and so on.
    #[serde(default)]
    pub prefix: String,
}

fn default_listen() -> String {
    "0.0.0.0:9477".to_string()
}

fn default_path() -> String {
    "/metrics".to_string()
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
            prefix: String::new(),
        }
    }
}

/// Polling schedule configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Seconds between the start of consecutive polls (default: 600).
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Also collect the capacity runway estimate (default: false).
    #[serde(default)]
    pub runway: bool,
}

fn default_interval() -> u64 {
    600 // 10 minutes
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            runway: false,
        }
    }
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.polling.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "interval_secs must be > 0".to_string(),
            ));
        }

        if self.cluster.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        if self
            .prometheus
            .listen
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::Validation(format!(
                "Invalid listen address: {}",
                self.prometheus.listen
            )));
        }

        if !self.prometheus.path.starts_with('/') {
            return Err(ConfigError::Validation(
                "Metrics path must start with /".to_string(),
            ));
        }

        if RESERVED_PATHS.contains(&self.prometheus.path.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Metrics path {} is reserved",
                self.prometheus.path
            )));
        }

        // The router would treat these as captures, not literals
        if self.prometheus.path.contains([':', '*']) {
            return Err(ConfigError::Validation(format!(
                "Metrics path {} must not contain ':' or '*'",
                self.prometheus.path
            )));
        }

        if !is_valid_prefix(&self.prometheus.prefix) {
            return Err(ConfigError::Validation(format!(
                "Invalid metric prefix: {}",
                self.prometheus.prefix
            )));
        }

        Ok(())
    }
}

/// Paths served by the built-in health endpoints.
const RESERVED_PATHS: [&str; 2] = ["/health", "/ready"];

/// An empty prefix, or one matching `[a-zA-Z_][a-zA-Z0-9_]*`.
fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        None => true,
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rubrik_common::LogFormat;

    #[test]
    fn test_parse_minimal_config() {
        let config = ExporterConfig::parse("{}").unwrap();

        assert_eq!(config.prometheus.listen, "0.0.0.0:9477");
        assert_eq!(config.prometheus.path, "/metrics");
        assert_eq!(config.prometheus.prefix, "");
        assert_eq!(config.polling.interval_secs, 600);
        assert!(!config.polling.runway);
        assert!(!config.cluster.verify_tls);
        assert_eq!(config.cluster.timeout_secs, 30);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            cluster: {
                verify_tls: true,
                timeout_secs: 10
            },
            prometheus: {
                listen: "127.0.0.1:8000",
                path: "/prometheus/metrics",
                prefix: "rubrik"
            },
            polling: {
                interval_secs: 60,
                runway: true
            },
            logging: {
                level: "debug",
                format: "json"
            }
        }"#;

        let config = ExporterConfig::parse(json).unwrap();

        assert!(config.cluster.verify_tls);
        assert_eq!(config.cluster.timeout_secs, 10);
        assert_eq!(config.prometheus.listen, "127.0.0.1:8000");
        assert_eq!(config.prometheus.path, "/prometheus/metrics");
        assert_eq!(config.prometheus.prefix, "rubrik");
        assert_eq!(config.polling.interval_secs, 60);
        assert!(config.polling.runway);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_validate_invalid_listen() {
        let json = r#"{
            prometheus: { listen: "not-an-address" }
        }"#;

        let result = ExporterConfig::parse(json);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid listen address")
        );
    }

    #[test]
    fn test_validate_invalid_path() {
        let json = r#"{
            prometheus: { path: "no-leading-slash" }
        }"#;

        let result = ExporterConfig::parse(json);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("must start with /")
        );
    }

    #[test]
    fn test_validate_reserved_path() {
        for path in ["/health", "/ready"] {
            let json = format!(r#"{{ prometheus: {{ path: "{}" }} }}"#, path);

            let result = ExporterConfig::parse(&json);
            assert!(
                matches!(result, Err(ConfigError::Validation(ref msg)) if msg.contains("reserved")),
                "{} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_validate_capture_segments_in_path() {
        for path in ["/:x", "/*rest", "/prometheus/:name/metrics"] {
            let json = format!(r#"{{ prometheus: {{ path: "{}" }} }}"#, path);
            assert!(
                matches!(ExporterConfig::parse(&json), Err(ConfigError::Validation(_))),
                "{} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_validate_zero_interval() {
        let json = r#"{
            polling: { interval_secs: 0 }
        }"#;

        assert!(ExporterConfig::parse(json).is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let json = r#"{
            cluster: { timeout_secs: 0 }
        }"#;

        assert!(ExporterConfig::parse(json).is_err());
    }

    #[test]
    fn test_validate_prefix() {
        assert!(is_valid_prefix(""));
        assert!(is_valid_prefix("rubrik"));
        assert!(is_valid_prefix("_cdm_01"));
        assert!(!is_valid_prefix("1rubrik"));
        assert!(!is_valid_prefix("rubrik-cdm"));

        let json = r#"{ prometheus: { prefix: "bad prefix" } }"#;
        assert!(ExporterConfig::parse(json).is_err());
    }
}
