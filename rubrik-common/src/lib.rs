//! Rubrik Common Library
//!
//! Shared pieces of the storage exporter:
//!
//! - [`config`] - Cluster credentials, HTTP and logging configuration
//! - [`client`] - Authenticated client for the cluster's internal API
//! - [`stats`] - Storage and runway statistics returned by the API
//! - [`error`] - Error types

pub mod client;
pub mod config;
pub mod error;
pub mod stats;

// Re-export commonly used types at the crate root
pub use client::ClusterClient;
pub use config::{ClusterConfig, Credentials, LogFormat, LoggingConfig};
pub use error::{CollectError, Error, Result};
pub use stats::{RunwaySnapshot, StorageSnapshot};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Example
///
/// ```ignore
/// use rubrik_common::{LoggingConfig, LogFormat, init_tracing};
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Json,
/// };
/// init_tracing(&config)?;
/// ```
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
