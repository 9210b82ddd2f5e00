//! JSON snapshot of classified dashboard data.
//!
//! Written by `--export` and by the `e` key. The only file the tool produces.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::classify::DASHBOARD_PENDING_CRITICAL;
use crate::data::window::apply;
use crate::data::{
    classify_pending, classify_row, classify_shard_health, classify_status, Bucket, BucketCounts,
    Metric, OperatorRow, ShardHealthSample, WindowSelector,
};

#[derive(Debug, Serialize)]
pub struct OperatorReport {
    pub endpoint: Option<String>,
    pub node_status: Option<String>,
    pub event_pending: Metric,
    pub status: Bucket,
    pub pending: Bucket,
    pub row: Bucket,
}

impl OperatorReport {
    fn from_row(row: &OperatorRow) -> Self {
        Self {
            endpoint: row.endpoint().map(str::to_string),
            node_status: row.node_status().map(str::to_string),
            event_pending: row.event_pending(),
            status: classify_status(row.node_status()),
            pending: classify_pending(row.event_pending(), DASHBOARD_PENDING_CRITICAL),
            row: classify_row(row),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShardHealthReport {
    pub window: String,
    pub samples: usize,
    pub counts: BucketCounts,
    pub latest: Option<ShardHealthSample>,
    pub bucket: Option<Bucket>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<BucketCounts>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operators: Vec<OperatorReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_health: Option<ShardHealthReport>,
}

impl Report {
    pub fn new(source: &str, now: DateTime<Utc>) -> Self {
        Self {
            generated_at: now,
            source: source.to_string(),
            summary: None,
            operators: Vec::new(),
            shard_health: None,
        }
    }

    pub fn with_operators(mut self, rows: &[OperatorRow]) -> Self {
        self.operators = rows.iter().map(OperatorReport::from_row).collect();
        self.summary = Some(BucketCounts::tally(self.operators.iter().map(|o| o.row)));
        self
    }

    /// Add shard health over a window. `samples` must be sorted ascending.
    pub fn with_shard_health(
        mut self,
        samples: &[ShardHealthSample],
        selector: WindowSelector,
    ) -> Self {
        let window = apply(samples, selector, self.generated_at);
        let latest = window.last().cloned();
        self.shard_health = Some(ShardHealthReport {
            window: selector.describe(),
            samples: window.len(),
            counts: BucketCounts::tally(window.iter().map(classify_shard_health)),
            bucket: latest.as_ref().map(classify_shard_health),
            latest,
        });
        self
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use tempfile::TempDir;

    #[test]
    fn test_report_classifies_and_writes() {
        let json = r#"[
            {"endpoint": "node-a:9185", "node_status": "Active", "event_pending": 0},
            {"endpoint": "node-b:9185", "node_status": "Active", "event_pending": 2500},
            {"endpoint": "node-c:9185", "node_status": "NA", "event_pending": "NA"}
        ]"#;
        let rows: Vec<OperatorRow> = serde_json::from_str(json).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 7, 12, 0, 0).unwrap();
        let samples = vec![ShardHealthSample {
            timestamp: now - TimeDelta::hours(1),
            redshards: Metric::Value(0),
            greenshards: Metric::Value(700),
            yellowshards: Metric::Value(300),
        }];

        let report = Report::new("test", now)
            .with_operators(&rows)
            .with_shard_health(&samples, WindowSelector::Span(TimeDelta::days(1)));

        let summary = report.summary.unwrap();
        assert_eq!((summary.ok, summary.warning, summary.critical), (1, 1, 1));
        assert_eq!(report.operators[1].pending, Bucket::Critical);
        assert_eq!(report.operators[2].status, Bucket::Unknown);
        let health = report.shard_health.as_ref().unwrap();
        assert_eq!(health.bucket, Some(Bucket::Ok));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        report.write_to(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let written: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(written["operators"][2]["event_pending"], "NA");
        assert_eq!(written["shard_health"]["window"], "last 1d");
        assert_eq!(written["summary"]["critical"], 1);
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let report = Report::new("test", Utc::now());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("operators").is_none());
        assert!(json.get("shard_health").is_none());
    }
}
