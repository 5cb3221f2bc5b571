use thiserror::Error;

/// Common error type for exporter setup.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing or empty credential: {0}")]
    MissingCredential(&'static str),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type alias using the common [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while collecting statistics from the cluster API.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The cluster rejected the credentials (HTTP 401/403).
    #[error("Authentication rejected by {url}: HTTP {status}")]
    Authentication { url: String, status: u16 },

    /// The endpoint was unreachable, timed out, or the transport failed.
    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Any other non-success response.
    #[error("API request to {url} failed with status {status}: {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    /// The response body did not contain the expected fields.
    #[error("Unexpected response from {path}: {message}")]
    Parse { path: String, message: String },
}

impl CollectError {
    /// Create a parse error for the given resource path.
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Short machine-friendly name of the error kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authentication { .. } => "authentication",
            Self::Network { .. } => "network",
            Self::Api { .. } => "api",
            Self::Parse { .. } => "parse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_error_kind() {
        let auth = CollectError::Authentication {
            url: "https://10.0.0.1/api/internal/stats/system_storage".to_string(),
            status: 401,
        };
        assert_eq!(auth.kind(), "authentication");
        assert!(auth.to_string().contains("HTTP 401"));

        let parse = CollectError::parse("/stats/system_storage", "missing field `total`");
        assert_eq!(parse.kind(), "parse");
        assert!(parse.to_string().contains("missing field `total`"));
    }

    #[test]
    fn test_missing_credential_message() {
        let err = Error::MissingCredential("RUBRIK_PASS");
        assert_eq!(err.to_string(), "Missing or empty credential: RUBRIK_PASS");
    }
}
