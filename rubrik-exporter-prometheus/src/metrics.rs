//! Gauge set and registry exposed on the metrics endpoint.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use rubrik_common::{RunwaySnapshot, StorageSnapshot};
use tracing::warn;

/// Storage gauges plus exporter self-metrics, owned by one registry.
///
/// Every gauge is individually atomic. The six storage gauges are not
/// updated as a group, so a scrape racing [`StorageMetrics::apply`] may see
/// a mix of old and new values.
pub struct StorageMetrics {
    registry: Registry,
    total: Gauge,
    used: Gauge,
    available: Gauge,
    snapshot: Gauge,
    live_mount: Gauge,
    misc: Gauge,
    runway_days: Option<Gauge<f64, AtomicU64>>,
    polls_succeeded: Counter,
    polls_failed: Counter,
    last_success: Gauge,
    last_error: RwLock<Option<String>>,
}

/// Snapshot of the poll bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Polls that updated the storage gauges.
    pub polls_succeeded: u64,
    /// Polls that failed and left the gauges untouched.
    pub polls_failed: u64,
    /// Unix time of the last successful poll, 0 if none yet.
    pub last_success_unix: i64,
    /// Message of the most recent failure, cleared on success.
    pub last_error: Option<String>,
}

/// Shareable metrics handle.
pub type SharedMetrics = Arc<StorageMetrics>;

impl StorageMetrics {
    /// Register all gauges under `prefix` (empty for none).
    ///
    /// The runway gauge is only registered when `with_runway` is set.
    pub fn new(prefix: &str, with_runway: bool) -> Self {
        let mut registry = if prefix.is_empty() {
            Registry::default()
        } else {
            Registry::with_prefix(prefix)
        };

        let total = Gauge::default();
        let used = Gauge::default();
        let available = Gauge::default();
        let snapshot = Gauge::default();
        let live_mount = Gauge::default();
        let misc = Gauge::default();

        registry.register(
            "total_storage_bytes",
            "Total storage in Rubrik cluster",
            total.clone(),
        );
        registry.register(
            "used_storage_bytes",
            "Used storage in Rubrik cluster",
            used.clone(),
        );
        registry.register(
            "available_storage_bytes",
            "Available storage in Rubrik cluster",
            available.clone(),
        );
        registry.register(
            "snapshot_storage_bytes",
            "Snapshot storage in Rubrik cluster",
            snapshot.clone(),
        );
        registry.register(
            "livemount_storage_bytes",
            "Live Mount storage in Rubrik cluster",
            live_mount.clone(),
        );
        registry.register(
            "misc_storage_bytes",
            "Miscellaneous storage in Rubrik cluster",
            misc.clone(),
        );

        let runway_days = with_runway.then(|| {
            let gauge = Gauge::<f64, AtomicU64>::default();
            registry.register(
                "runway_remaining_days",
                "Runway remaining, in days, on Rubrik cluster",
                gauge.clone(),
            );
            gauge
        });

        let polls_succeeded = Counter::default();
        let polls_failed = Counter::default();
        let last_success = Gauge::default();

        registry.register(
            "exporter_polls_succeeded",
            "Polls that updated the storage gauges",
            polls_succeeded.clone(),
        );
        registry.register(
            "exporter_polls_failed",
            "Polls that failed and left the storage gauges unchanged",
            polls_failed.clone(),
        );
        registry.register(
            "exporter_last_success_timestamp_seconds",
            "Unix time of the last successful poll",
            last_success.clone(),
        );

        Self {
            registry,
            total,
            used,
            available,
            snapshot,
            live_mount,
            misc,
            runway_days,
            polls_succeeded,
            polls_failed,
            last_success,
            last_error: RwLock::new(None),
        }
    }

    /// Copy a complete snapshot into the six storage gauges.
    ///
    /// Counts above `i64::MAX` are clamped and logged.
    pub fn apply(&self, snapshot: &StorageSnapshot) {
        self.total.set(to_gauge("total", snapshot.total));
        self.used.set(to_gauge("used", snapshot.used));
        self.available.set(to_gauge("available", snapshot.available));
        self.snapshot.set(to_gauge("snapshot", snapshot.snapshot));
        self.live_mount.set(to_gauge("liveMount", snapshot.live_mount));
        self.misc.set(to_gauge("miscellaneous", snapshot.miscellaneous));
    }

    /// Update the runway gauge. No-op when runway collection is disabled.
    pub fn apply_runway(&self, runway: &RunwaySnapshot) {
        if let Some(gauge) = &self.runway_days {
            gauge.set(runway.days);
        }
    }

    /// Whether the runway gauge is registered.
    pub fn collects_runway(&self) -> bool {
        self.runway_days.is_some()
    }

    /// Current values of the six storage gauges.
    pub fn current(&self) -> StorageSnapshot {
        StorageSnapshot {
            total: from_gauge(self.total.get()),
            used: from_gauge(self.used.get()),
            available: from_gauge(self.available.get()),
            snapshot: from_gauge(self.snapshot.get()),
            live_mount: from_gauge(self.live_mount.get()),
            miscellaneous: from_gauge(self.misc.get()),
        }
    }

    /// Record a successful poll.
    pub fn record_success(&self) {
        self.polls_succeeded.inc();
        self.last_success.set(unix_now());
        *self.last_error.write() = None;
    }

    /// Record a failed poll.
    pub fn record_failure(&self, error: impl fmt::Display) {
        self.polls_failed.inc();
        *self.last_error.write() = Some(error.to_string());
    }

    /// Get poll statistics.
    pub fn stats(&self) -> PollStats {
        PollStats {
            polls_succeeded: self.polls_succeeded.get(),
            polls_failed: self.polls_failed.get(),
            last_success_unix: self.last_success.get(),
            last_error: self.last_error.read().clone(),
        }
    }

    /// Render the registry in text exposition format.
    pub fn render(&self) -> Result<String, fmt::Error> {
        let mut output = String::with_capacity(2048);
        encode(&mut output, &self.registry)?;
        Ok(output)
    }
}

fn to_gauge(field: &str, bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or_else(|_| {
        warn!(field, bytes, "Byte count exceeds gauge range, clamping to i64::MAX");
        i64::MAX
    })
}

fn from_gauge(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
