//! Status classification.
//!
//! Maps raw record fields to display buckets. Rules are evaluated top to
//! bottom and the first match wins. Thresholds are fixed constants.

use serde::Serialize;

use super::records::{Metric, OperatorRow, ShardHealthSample, SENTINEL};

/// Node status label that counts as healthy.
pub const ACTIVE_STATUS: &str = "Active";

/// Pending events above this are critical in the operator history strips.
pub const HISTORY_PENDING_CRITICAL: u64 = 200;

/// Pending events above this are critical in the operators table.
pub const DASHBOARD_PENDING_CRITICAL: u64 = 2000;

/// Green shards needed for the network to be healthy (two thirds of 1000).
pub const SHARD_QUORUM: u64 = 667;

/// Display bucket for a status reading.
///
/// Ordered by severity so the worst of several buckets is their `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Ok,
    Unknown,
    Warning,
    Critical,
}

impl Bucket {
    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Ok => "Healthy",
            Bucket::Unknown => "Unknown",
            Bucket::Warning => "Warning",
            Bucket::Critical => "Critical",
        }
    }
}

/// Number of records falling in each bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub ok: usize,
    pub unknown: usize,
    pub warning: usize,
    pub critical: usize,
}

impl BucketCounts {
    pub fn tally(buckets: impl IntoIterator<Item = Bucket>) -> Self {
        let mut counts = Self::default();
        for bucket in buckets {
            match bucket {
                Bucket::Ok => counts.ok += 1,
                Bucket::Unknown => counts.unknown += 1,
                Bucket::Warning => counts.warning += 1,
                Bucket::Critical => counts.critical += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.ok + self.unknown + self.warning + self.critical
    }

    /// Most severe bucket present, or `None` when empty.
    pub fn worst(&self) -> Option<Bucket> {
        if self.critical > 0 {
            Some(Bucket::Critical)
        } else if self.warning > 0 {
            Some(Bucket::Warning)
        } else if self.unknown > 0 {
            Some(Bucket::Unknown)
        } else if self.ok > 0 {
            Some(Bucket::Ok)
        } else {
            None
        }
    }
}

/// Display bucket for the number of operators that have held a shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerBucket {
    One,
    Two,
    Three,
    Four,
    /// Five or more owners, or a shard with no recorded owner.
    Other,
}

/// Classify a node status label.
///
/// Only the `"NA"` sentinel is unknown; a missing label is as bad as any
/// other non-active one.
pub fn classify_status(label: Option<&str>) -> Bucket {
    match label {
        Some(ACTIVE_STATUS) => Bucket::Ok,
        Some(SENTINEL) => Bucket::Unknown,
        _ => Bucket::Critical,
    }
}

/// Classify a pending-event count against a critical threshold.
pub fn classify_pending(pending: Metric, critical_above: u64) -> Bucket {
    match pending {
        Metric::Unavailable => Bucket::Unknown,
        Metric::Value(v) if v > critical_above => Bucket::Critical,
        Metric::Value(v) if v > 0 => Bucket::Warning,
        Metric::Value(_) => Bucket::Ok,
    }
}

/// Classify how many operators have owned a shard.
pub fn classify_owners(owners: u64) -> OwnerBucket {
    match owners {
        1 => OwnerBucket::One,
        2 => OwnerBucket::Two,
        3 => OwnerBucket::Three,
        4 => OwnerBucket::Four,
        _ => OwnerBucket::Other,
    }
}

/// Tint for a row of the operators table.
///
/// An inactive node is critical; otherwise any unavailable column or any
/// pending event is a warning.
pub fn classify_row(row: &OperatorRow) -> Bucket {
    if row.node_status() != Some(ACTIVE_STATUS) {
        Bucket::Critical
    } else if row.has_unavailable() || row.event_pending().value().is_some_and(|v| v > 0) {
        Bucket::Warning
    } else {
        Bucket::Ok
    }
}

/// Classify network shard health against the quorum line.
pub fn classify_shard_health(sample: &ShardHealthSample) -> Bucket {
    let (green, yellow) = match (sample.greenshards, sample.yellowshards) {
        (Metric::Value(green), Metric::Value(yellow)) => (green, yellow),
        _ => return Bucket::Unknown,
    };
    // Counters come straight off the wire
    if green >= SHARD_QUORUM {
        Bucket::Ok
    } else if green.saturating_add(yellow) >= SHARD_QUORUM {
        Bucket::Warning
    } else {
        Bucket::Critical
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{TimeZone, Timelike, Utc};

    use super::*;
    use crate::data::records::OperatorSample;
    use crate::data::window::{apply, WindowSelector};

    fn status(sample: &OperatorSample) -> Bucket {
        classify_status(sample.node_status.as_deref())
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(classify_status(Some("Active")), Bucket::Ok);
        assert_eq!(classify_status(Some("NA")), Bucket::Unknown);
        assert_eq!(classify_status(None), Bucket::Critical);
        assert_eq!(classify_status(Some("Down")), Bucket::Critical);
        assert_eq!(classify_status(Some("active")), Bucket::Critical);
    }

    #[test]
    fn test_pending_thresholds() {
        for threshold in [HISTORY_PENDING_CRITICAL, DASHBOARD_PENDING_CRITICAL] {
            let bucket = |pending| classify_pending(Metric::Value(pending), threshold);
            assert_eq!(bucket(0), Bucket::Ok);
            assert_eq!(bucket(1), Bucket::Warning);
            assert_eq!(bucket(threshold), Bucket::Warning);
            assert_eq!(bucket(threshold + 1), Bucket::Critical);
            let unavailable = classify_pending(Metric::Unavailable, threshold);
            assert_eq!(unavailable, Bucket::Unknown);
        }
    }

    #[test]
    fn test_owner_buckets() {
        let small: HashSet<OwnerBucket> = (1..=4).map(classify_owners).collect();
        assert_eq!(small.len(), 4);
        assert!(!small.contains(&OwnerBucket::Other));
        assert_eq!(classify_owners(5), OwnerBucket::Other);
        assert_eq!(classify_owners(100), OwnerBucket::Other);
        assert_eq!(classify_owners(0), OwnerBucket::Other);
    }

    #[test]
    fn test_row_tint() {
        let row = |json: &str| -> OperatorRow { serde_json::from_str(json).unwrap() };
        assert_eq!(
            classify_row(&row(r#"{"node_status": "Active", "event_pending": 0}"#)),
            Bucket::Ok
        );
        assert_eq!(
            classify_row(&row(r#"{"node_status": "Active", "event_pending": 4}"#)),
            Bucket::Warning
        );
        assert_eq!(
            classify_row(&row(r#"{"node_status": "Active", "event_pending": 0, "version": "NA"}"#)),
            Bucket::Warning
        );
        assert_eq!(
            classify_row(&row(r#"{"node_status": "Down", "event_pending": 0}"#)),
            Bucket::Critical
        );
    }

    #[test]
    fn test_missing_status_is_critical_everywhere() {
        let row: OperatorRow = serde_json::from_str(r#"{"event_pending": 0}"#).unwrap();
        let sample: OperatorSample =
            serde_json::from_str(r#"{"timestamp": "2025-01-07 10:00:00"}"#).unwrap();

        assert_eq!(classify_row(&row), Bucket::Critical);
        assert_eq!(classify_status(row.node_status()), Bucket::Critical);
        assert_eq!(status(&sample), Bucket::Critical);
    }

    #[test]
    fn test_shard_health_quorum() {
        let sample = |green, yellow| ShardHealthSample {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 7, 0, 0, 0).unwrap(),
            redshards: Metric::Value(1000 - green - yellow),
            greenshards: Metric::Value(green),
            yellowshards: Metric::Value(yellow),
        };
        assert_eq!(classify_shard_health(&sample(667, 0)), Bucket::Ok);
        assert_eq!(classify_shard_health(&sample(600, 67)), Bucket::Warning);
        assert_eq!(classify_shard_health(&sample(600, 66)), Bucket::Critical);
    }

    #[test]
    fn test_shard_health_huge_counters() {
        let json = r#"{
            "timestamp": "2025-01-07 10:00:00",
            "redshards": 0,
            "greenshards": 1,
            "yellowshards": 18446744073709551615
        }"#;
        let sample: ShardHealthSample = serde_json::from_str(json).unwrap();
        assert_eq!(classify_shard_health(&sample), Bucket::Warning);

        let missing = ShardHealthSample {
            yellowshards: Metric::Unavailable,
            ..sample
        };
        assert_eq!(classify_shard_health(&missing), Bucket::Unknown);
    }

    #[test]
    fn test_window_then_classify() {
        let sample = |hour, status: &str| OperatorSample {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 7, hour, 0, 0).unwrap(),
            node_status: Some(status.to_string()),
            event_pending: Metric::Value(0),
            owned: Metric::Value(1),
            shard_ready: Metric::Value(1),
        };
        let records = vec![sample(9, "Active"), sample(10, "NA"), sample(11, "Down")];
        let now = Utc.with_ymd_and_hms(2025, 1, 7, 12, 0, 0).unwrap();

        let window = apply(&records, WindowSelector::Count(2), now);
        let hours: Vec<u32> = window.iter().map(|r| r.timestamp.hour()).collect();
        assert_eq!(hours, vec![10, 11]);

        let buckets: Vec<Bucket> = window.iter().map(status).collect();
        assert_eq!(buckets, vec![Bucket::Unknown, Bucket::Critical]);
    }

    #[test]
    fn test_bucket_counts() {
        let buckets = [Bucket::Ok, Bucket::Warning, Bucket::Ok, Bucket::Unknown];
        let counts = BucketCounts::tally(buckets);
        assert_eq!(counts.ok, 2);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.worst(), Some(Bucket::Warning));
        assert_eq!(BucketCounts::default().worst(), None);
    }

    #[test]
    fn test_empty_window_classifies_to_nothing() {
        let records: Vec<OperatorSample> = Vec::new();
        let window = apply(&records, WindowSelector::Count(2), Utc::now());
        let buckets: Vec<Bucket> = window.iter().map(status).collect();
        assert!(buckets.is_empty());
    }
}
