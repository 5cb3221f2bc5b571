//! Statistics returned by the cluster's internal stats API.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::CollectError;

/// Internal API path of the system storage summary.
pub const SYSTEM_STORAGE_PATH: &str = "/stats/system_storage";

/// Internal API path of the runway estimate.
pub const RUNWAY_REMAINING_PATH: &str = "/stats/runway_remaining";

/// Cluster-wide storage usage in bytes, as reported by one API call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSnapshot {
    #[serde(deserialize_with = "byte_count")]
    pub total: u64,
    #[serde(deserialize_with = "byte_count")]
    pub used: u64,
    #[serde(deserialize_with = "byte_count")]
    pub available: u64,
    #[serde(deserialize_with = "byte_count")]
    pub snapshot: u64,
    #[serde(deserialize_with = "byte_count")]
    pub live_mount: u64,
    #[serde(deserialize_with = "byte_count")]
    pub miscellaneous: u64,
}

impl StorageSnapshot {
    /// Extract a snapshot from a `/stats/system_storage` response body.
    ///
    /// All six fields must be present; unknown fields are ignored.
    pub fn from_json(value: Value) -> Result<Self, CollectError> {
        serde_json::from_value(value)
            .map_err(|e| CollectError::parse(SYSTEM_STORAGE_PATH, e.to_string()))
    }
}

/// Estimated days until the cluster runs out of capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunwaySnapshot {
    pub days: f64,
}

impl RunwaySnapshot {
    /// Extract the runway from a `/stats/runway_remaining` response body.
    pub fn from_json(value: Value) -> Result<Self, CollectError> {
        let snapshot: Self = serde_json::from_value(value)
            .map_err(|e| CollectError::parse(RUNWAY_REMAINING_PATH, e.to_string()))?;

        if !snapshot.days.is_finite() {
            return Err(CollectError::parse(
                RUNWAY_REMAINING_PATH,
                "days is not a finite number",
            ));
        }

        Ok(snapshot)
    }
}

fn byte_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    number_to_bytes(&number).ok_or_else(|| {
        de::Error::custom(format!("expected a non-negative byte count, got {}", number))
    })
}

/// The API reports integers, but some releases serialize large values as
/// floats.
fn number_to_bytes(number: &Number) -> Option<u64> {
    if let Some(v) = number.as_u64() {
        return Some(v);
    }

    match number.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f <= u64::MAX as f64 => Some(f.round() as u64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_storage_snapshot_from_json() {
        let body = json!({
            "total": 1000,
            "used": 400,
            "available": 600,
            "snapshot": 100,
            "liveMount": 50,
            "miscellaneous": 10,
            "pendingSnapshot": 7,
            "lastUpdateTime": "2019-01-01T00:00:00Z"
        });

        let snapshot = StorageSnapshot::from_json(body).unwrap();

        assert_eq!(
            snapshot,
            StorageSnapshot {
                total: 1000,
                used: 400,
                available: 600,
                snapshot: 100,
                live_mount: 50,
                miscellaneous: 10,
            }
        );
    }

    #[test]
    fn test_storage_snapshot_accepts_float_values() {
        let body = json!({
            "total": 2.5e12,
            "used": 1.0e12,
            "available": 1.5e12,
            "snapshot": 0.0,
            "liveMount": 0,
            "miscellaneous": 1024.4
        });

        let snapshot = StorageSnapshot::from_json(body).unwrap();

        assert_eq!(snapshot.total, 2_500_000_000_000);
        assert_eq!(snapshot.miscellaneous, 1024);
    }

    #[test]
    fn test_storage_snapshot_missing_field() {
        let body = json!({
            "total": 1000,
            "used": 400,
            "available": 600,
            "snapshot": 100,
            "miscellaneous": 10
        });

        let err = StorageSnapshot::from_json(body).unwrap_err();

        assert_eq!(err.kind(), "parse");
        assert!(err.to_string().contains("liveMount"));
    }

    #[test]
    fn test_storage_snapshot_rejects_negative_and_text() {
        let negative = json!({
            "total": -1, "used": 0, "available": 0,
            "snapshot": 0, "liveMount": 0, "miscellaneous": 0
        });
        assert!(StorageSnapshot::from_json(negative).is_err());

        let text = json!({
            "total": "1000", "used": 0, "available": 0,
            "snapshot": 0, "liveMount": 0, "miscellaneous": 0
        });
        assert!(StorageSnapshot::from_json(text).is_err());
    }

    #[test]
    fn test_storage_snapshot_rejects_non_object() {
        let err = StorageSnapshot::from_json(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, CollectError::Parse { .. }));
    }

    #[test]
    fn test_runway_snapshot_from_json() {
        let runway = RunwaySnapshot::from_json(json!({ "days": 212 })).unwrap();
        assert_eq!(runway.days, 212.0);

        assert!(RunwaySnapshot::from_json(json!({ "weeks": 3 })).is_err());
    }
}
