use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Environment variables holding the cluster credentials, with the names used
/// by the Go client as fallbacks.
pub const ENV_ADDRESS: [&str; 2] = ["RUBRIK_IP", "rubrik_cdm_node_ip"];
pub const ENV_USERNAME: [&str; 2] = ["RUBRIK_USER", "rubrik_cdm_username"];
pub const ENV_PASSWORD: [&str; 2] = ["RUBRIK_PASS", "rubrik_cdm_password"];

/// Credentials for the cluster API.
///
/// Read once at startup and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    address: String,
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials, rejecting empty values.
    pub fn new(
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let address = non_empty(address.into(), ENV_ADDRESS[0])?;
        let username = non_empty(username.into(), ENV_USERNAME[0])?;
        let password = non_empty(password.into(), ENV_PASSWORD[0])?;

        Ok(Self {
            address,
            username,
            password,
        })
    }

    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let find = |names: [&'static str; 2]| -> Result<String> {
            names
                .iter()
                .find_map(|name| lookup(*name).filter(|v| !v.trim().is_empty()))
                .ok_or(Error::MissingCredential(names[0]))
        };

        Self::new(find(ENV_ADDRESS)?, find(ENV_USERNAME)?, find(ENV_PASSWORD)?)
    }

    /// Cluster node address as configured (host, IP, or URL).
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Base URL of the cluster, without trailing slash.
    ///
    /// Bare hosts get an `https://` scheme.
    pub fn base_url(&self) -> String {
        let address = self.address.trim_end_matches('/');
        if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("https://{}", address)
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn non_empty(value: String, name: &'static str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::MissingCredential(name));
    }
    Ok(value)
}

/// HTTP settings for talking to the cluster API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Verify the cluster's TLS certificate (default: false, clusters ship
    /// with self-signed certificates).
    #[serde(default)]
    pub verify_tls: bool,

    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            verify_tls: false,
            timeout_secs: default_timeout(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_credentials_from_primary_names() {
        let creds = Credentials::from_lookup(lookup_from(&[
            ("RUBRIK_IP", "10.0.0.1"),
            ("RUBRIK_USER", "admin"),
            ("RUBRIK_PASS", "secret"),
        ]))
        .unwrap();

        assert_eq!(creds.address(), "10.0.0.1");
        assert_eq!(creds.username(), "admin");
        assert_eq!(creds.password(), "secret");
    }

    #[test]
    fn test_credentials_fallback_names() {
        let creds = Credentials::from_lookup(lookup_from(&[
            ("rubrik_cdm_node_ip", "cluster.example.com"),
            ("rubrik_cdm_username", "svc"),
            ("rubrik_cdm_password", "pw"),
        ]))
        .unwrap();

        assert_eq!(creds.address(), "cluster.example.com");
        assert_eq!(creds.username(), "svc");
    }

    #[test]
    fn test_credentials_missing_password() {
        let result = Credentials::from_lookup(lookup_from(&[
            ("RUBRIK_IP", "10.0.0.1"),
            ("RUBRIK_USER", "admin"),
        ]));

        assert!(matches!(result, Err(Error::MissingCredential("RUBRIK_PASS"))));
    }

    #[test]
    fn test_credentials_empty_value_rejected() {
        let result = Credentials::new("10.0.0.1", "   ", "pw");
        assert!(matches!(result, Err(Error::MissingCredential("RUBRIK_USER"))));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("10.0.0.1", "admin", "hunter2").unwrap();
        let debug = format!("{:?}", creds);

        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_base_url() {
        let bare = Credentials::new("10.0.0.1", "u", "p").unwrap();
        assert_eq!(bare.base_url(), "https://10.0.0.1");

        let with_scheme = Credentials::new("http://127.0.0.1:8080/", "u", "p").unwrap();
        assert_eq!(with_scheme.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_default_cluster_config() {
        let config: ClusterConfig = json5::from_str("{}").unwrap();

        assert!(!config.verify_tls);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_json_logging_format() {
        let content = r#"
        {
            level: "debug",
            format: "json",
        }
        "#;

        let config: LoggingConfig = json5::from_str(content).unwrap();

        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
    }
}
