//! Authenticated client for the cluster REST API.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::{ClusterConfig, Credentials};
use crate::error::{CollectError, Result};
use crate::stats::{
    RUNWAY_REMAINING_PATH, RunwaySnapshot, SYSTEM_STORAGE_PATH, StorageSnapshot,
};

/// Client for a single cluster.
///
/// Every request carries HTTP Basic credentials; no session token is cached
/// and nothing is retried.
#[derive(Debug, Clone)]
pub struct ClusterClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl ClusterClient {
    /// Create a client from credentials and HTTP settings.
    pub fn new(credentials: Credentials, config: &ClusterConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .user_agent(concat!("rubrik-storage-exporter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: credentials.base_url(),
            credentials,
        })
    }

    /// Base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of an internal API resource.
    pub fn internal_url(&self, path: &str) -> String {
        format!("{}/api/internal{}", self.base_url, path)
    }

    /// GET an internal API resource and return its JSON body.
    pub async fn get_internal(&self, path: &str) -> std::result::Result<Value, CollectError> {
        let url = self.internal_url(path);
        trace!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .basic_auth(
                self.credentials.username(),
                Some(self.credentials.password()),
            )
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| CollectError::Network {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CollectError::Authentication {
                url,
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(CollectError::Api {
                url,
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.bytes().await.map_err(|source| CollectError::Network {
            url: url.clone(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|e| CollectError::parse(path, e.to_string()))
    }

    /// Fetch the cluster storage summary.
    pub async fn fetch_storage(&self) -> std::result::Result<StorageSnapshot, CollectError> {
        let body = self.get_internal(SYSTEM_STORAGE_PATH).await?;
        let snapshot = StorageSnapshot::from_json(body)?;
        debug!(
            total = snapshot.total,
            used = snapshot.used,
            available = snapshot.available,
            "Fetched storage statistics"
        );
        Ok(snapshot)
    }

    /// Fetch the remaining capacity runway.
    pub async fn fetch_runway(&self) -> std::result::Result<RunwaySnapshot, CollectError> {
        let body = self.get_internal(RUNWAY_REMAINING_PATH).await?;
        let runway = RunwaySnapshot::from_json(body)?;
        debug!(days = runway.days, "Fetched runway remaining");
        Ok(runway)
    }
}
