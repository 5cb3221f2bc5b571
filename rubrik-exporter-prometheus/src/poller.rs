//! Periodic polling of the cluster into the gauge set.

use std::future::Future;
use std::time::Duration;

use rubrik_common::{ClusterClient, CollectError, RunwaySnapshot, StorageSnapshot};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::metrics::SharedMetrics;

/// Source of cluster statistics.
pub trait StatsSource: Send + Sync {
    /// Fetch the storage summary.
    fn fetch_storage(&self) -> impl Future<Output = Result<StorageSnapshot, CollectError>> + Send;

    /// Fetch the capacity runway.
    fn fetch_runway(&self) -> impl Future<Output = Result<RunwaySnapshot, CollectError>> + Send;
}

impl StatsSource for ClusterClient {
    async fn fetch_storage(&self) -> Result<StorageSnapshot, CollectError> {
        ClusterClient::fetch_storage(self).await
    }

    async fn fetch_runway(&self) -> Result<RunwaySnapshot, CollectError> {
        ClusterClient::fetch_runway(self).await
    }
}

/// Polls a [`StatsSource`] on a fixed period and writes the results into the
/// shared metrics.
pub struct Poller<S> {
    source: S,
    metrics: SharedMetrics,
    interval: Duration,
}

impl<S: StatsSource> Poller<S> {
    /// Create a new poller.
    pub fn new(source: S, metrics: SharedMetrics, interval: Duration) -> Self {
        Self {
            source,
            metrics,
            interval,
        }
    }

    /// Run the polling loop until the shutdown signal is received.
    ///
    /// The first poll happens immediately; later polls start one interval
    /// after the previous one started. A failed poll is logged and the loop
    /// carries on.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            runway = self.metrics.collects_runway(),
            "Starting poller"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.poll_cycle().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Poller stopped");
    }

    /// One scheduled cycle. The outcome is already recorded in the metrics.
    async fn poll_cycle(&self) {
        if let Err(e) = self.poll_once().await {
            debug!(kind = e.kind(), "Keeping previous storage values until the next poll");
        }
    }

    /// Perform a single poll cycle.
    ///
    /// On failure the storage gauges keep their previous values.
    pub async fn poll_once(&self) -> Result<StorageSnapshot, CollectError> {
        let result = self.source.fetch_storage().await;

        match &result {
            Ok(snapshot) => {
                self.metrics.apply(snapshot);
                self.metrics.record_success();
                debug!(
                    total = snapshot.total,
                    used = snapshot.used,
                    available = snapshot.available,
                    snapshot = snapshot.snapshot,
                    live_mount = snapshot.live_mount,
                    miscellaneous = snapshot.miscellaneous,
                    "Storage gauges updated"
                );
            }
            Err(e) => {
                self.metrics.record_failure(e);
                error!(kind = e.kind(), error = %e, "Storage poll failed");
            }
        }

        if self.metrics.collects_runway() {
            match self.source.fetch_runway().await {
                Ok(runway) => self.metrics.apply_runway(&runway),
                Err(e) => warn!(kind = e.kind(), error = %e, "Runway poll failed"),
            }
        }

        result
    }
}
