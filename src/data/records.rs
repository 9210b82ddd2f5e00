//! Record types returned by the Walrus statistics API.
//!
//! The API is loose about types: counters arrive as numbers, numeric strings
//! or the `"NA"` sentinel, and timestamps come in several textual layouts.
//! Everything here deserializes leniently so one odd field shows up as `-`
//! in the UI instead of failing the whole fetch.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::window::Timestamped;

/// Placeholder the API uses for "value unavailable".
pub const SENTINEL: &str = "NA";

/// A numeric reading that may be unavailable.
///
/// The API reports missing readings as the string `"NA"`; that is kept
/// distinct from a real zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Value(u64),
    #[default]
    Unavailable,
}

impl Metric {
    /// Returns the reading, if available.
    pub fn value(&self) -> Option<u64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::Unavailable => None,
        }
    }

    fn from_json(value: &Value) -> Self {
        let reading = match value {
            Value::Number(n) => n.as_u64().or_else(|| whole_number(n.as_f64())),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        reading.map_or(Metric::Unavailable, Metric::Value)
    }
}

/// Non-negative float readings such as `3.0`, truncated.
fn whole_number(f: Option<f64>) -> Option<u64> {
    f.filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{}", v),
            Metric::Unavailable => f.write_str(SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Metric::from_json(&value))
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metric::Value(v) => serializer.serialize_u64(*v),
            Metric::Unavailable => serializer.serialize_str(SENTINEL),
        }
    }
}

/// Parse the timestamp layouts seen from the API.
///
/// Accepts RFC 3339, RFC 2822, and naive `YYYY-MM-DD HH:MM:SS[.fff]`
/// (with a space or `T`), which is taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn timestamp_from_json(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => {
            let millis = n.as_i64()?;
            Utc.timestamp_millis_opt(millis).single()
        }
        _ => None,
    }
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    timestamp_from_json(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp: {}", value)))
}

fn deserialize_optional_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(timestamp_from_json(&value))
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Metric::deserialize(deserializer)?
        .value()
        .ok_or_else(|| serde::de::Error::custom("expected a numeric id"))
}

/// Render a JSON scalar the way a table cell shows it.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// One row of `get_latest_values`: the latest status of a single operator.
///
/// Columns are kept in server order because the table shows whatever the
/// API sends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorRow {
    columns: Map<String, Value>,
}

/// Columns the operators table never shows.
pub const HIDDEN_OPERATOR_COLUMNS: &[&str] = &["id", "uptime_secs", "timestamp"];

impl OperatorRow {
    pub fn new(columns: Map<String, Value>) -> Self {
        Self { columns }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.columns.get(key)
    }

    /// Network endpoint of the operator, used to look up its history.
    pub fn endpoint(&self) -> Option<&str> {
        self.columns.get("endpoint").and_then(Value::as_str)
    }

    pub fn node_status(&self) -> Option<&str> {
        self.columns.get("node_status").and_then(Value::as_str)
    }

    pub fn event_pending(&self) -> Metric {
        self.columns
            .get("event_pending")
            .map(Metric::from_json)
            .unwrap_or_default()
    }

    /// Raw timestamp text as sent by the API.
    pub fn timestamp_text(&self) -> Option<String> {
        self.columns.get("timestamp").map(display_value)
    }

    /// True if any column holds the `"NA"` sentinel.
    pub fn has_unavailable(&self) -> bool {
        self.columns.values().any(|v| v.as_str() == Some(SENTINEL))
    }

    /// Visible columns in server order.
    pub fn visible_columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .filter(|(k, _)| !HIDDEN_OPERATOR_COLUMNS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Case-insensitive substring match against every column value.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        self.columns
            .values()
            .any(|v| display_value(v).to_lowercase().contains(&needle))
    }
}

/// Network-wide scalar constants from `walrus-constants`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkConstants {
    values: Map<String, Value>,
}

impl NetworkConstants {
    /// Constants to display, excluding bookkeeping keys.
    pub fn visible(&self) -> impl Iterator<Item = (&str, String)> {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != "time" && k.as_str() != "id")
            .map(|(k, v)| (k.as_str(), display_value(v)))
    }
}

/// One historic observation of an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorSample {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub node_status: Option<String>,
    #[serde(default)]
    pub event_pending: Metric,
    #[serde(default)]
    pub owned: Metric,
    #[serde(default)]
    pub shard_ready: Metric,
}

impl Timestamped for OperatorSample {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Network-wide shard health counters at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardHealthSample {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub redshards: Metric,
    #[serde(default)]
    pub greenshards: Metric,
    #[serde(default)]
    pub yellowshards: Metric,
}

impl Timestamped for ShardHealthSample {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// A period during which one operator held a shard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerInterval {
    pub networkaddress: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Current and historic ownership of one shard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardInfo {
    #[serde(deserialize_with = "deserialize_id")]
    pub shardid: u64,
    #[serde(default)]
    pub networkaddress: String,
    #[serde(default)]
    pub nshards: Metric,
    #[serde(default)]
    pub owners: Metric,
    #[serde(default)]
    pub network_address_intervals: Vec<OwnerInterval>,
}

impl ShardInfo {
    /// Ownership intervals, newest first.
    pub fn intervals_newest_first(&self) -> Vec<&OwnerInterval> {
        let mut intervals: Vec<&OwnerInterval> = self.network_address_intervals.iter().collect();
        intervals.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        intervals
    }
}

/// On-chain fields of a blob object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlobObject {
    #[serde(default)]
    pub deletable: Option<bool>,
    #[serde(default)]
    pub epoch: Metric,
    #[serde(default)]
    pub end_epoch: Metric,
    #[serde(default)]
    pub size: Metric,
}

/// Response of `get_blob_info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlobInfo {
    #[serde(rename = "parsedJson", default)]
    pub parsed: Option<BlobObject>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
}

impl BlobInfo {
    /// Object type with the package address stripped (everything after the first `::`).
    pub fn type_suffix(&self) -> String {
        self.type_name
            .as_deref()
            .and_then(|type_name| type_name.split_once("::"))
            .map(|(_, suffix)| suffix.to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_sentinel_and_numbers() {
        let json = r#"[0, 12, "7", "NA", null, -1, 3.0]"#;
        let values: Vec<Metric> = serde_json::from_str(json).unwrap();
        assert_eq!(
            values,
            vec![
                Metric::Value(0),
                Metric::Value(12),
                Metric::Value(7),
                Metric::Unavailable,
                Metric::Unavailable,
                Metric::Unavailable,
                Metric::Value(3),
            ]
        );
        let sentinel = serde_json::to_string(&Metric::Unavailable).unwrap();
        assert_eq!(sentinel, r#""NA""#);
        assert_eq!(Metric::default(), Metric::Unavailable);
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 7, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-01-07T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-07T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-07 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-07 10:30:00.000"), Some(expected));
        let http_date = parse_timestamp("Tue, 07 Jan 2025 10:30:00 GMT");
        assert_eq!(http_date, Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_operator_sample_with_sentinel() {
        let json = r#"{
            "timestamp": "2025-01-07 10:00:00",
            "node_status": "Active",
            "event_pending": "NA",
            "owned": 12,
            "shard_ready": 11
        }"#;
        let sample: OperatorSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.node_status.as_deref(), Some("Active"));
        assert_eq!(sample.event_pending, Metric::Unavailable);
        assert_eq!(sample.owned, Metric::Value(12));
    }

    #[test]
    fn test_missing_fields_do_not_fail() {
        let json = r#"{"timestamp": 1736245800000}"#;
        let sample: OperatorSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.node_status, None);
        assert_eq!(sample.owned, Metric::Unavailable);
    }

    #[test]
    fn test_operator_row_columns_keep_order() {
        let json = r#"{"id": 4, "endpoint": "node-b.example:9185", "node_status": "Active",
                        "event_pending": 3, "uptime_secs": 10, "timestamp": "2025-01-07 10:00:00",
                        "version": "1.2.0"}"#;
        let row: OperatorRow = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = row.visible_columns().map(|(k, _)| k).collect();
        let expected = ["endpoint", "node_status", "event_pending", "version"];
        assert_eq!(keys, expected);
        assert_eq!(row.endpoint(), Some("node-b.example:9185"));
        assert_eq!(row.event_pending(), Metric::Value(3));
        assert!(!row.has_unavailable());
        assert!(row.matches("NODE-B"));
        assert!(!row.matches("node-c"));
    }

    #[test]
    fn test_constants_hide_bookkeeping() {
        let json = r#"{"id": 1, "epoch": 42, "time": "x", "n_shards": 1000}"#;
        let constants: NetworkConstants = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = constants.visible().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["epoch", "n_shards"]);
    }

    #[test]
    fn test_shard_info_intervals_newest_first() {
        let json = r#"{
            "shardid": "17",
            "networkaddress": "node-a:9185",
            "nshards": 40,
            "owners": 2,
            "network_address_intervals": [
                {
                    "networkaddress": "node-c:9185",
                    "start_time": "2024-12-01 00:00:00",
                    "end_time": "2025-01-01 00:00:00"
                },
                {
                    "networkaddress": "node-a:9185",
                    "start_time": "2025-01-01 00:00:00",
                    "end_time": null
                }
            ]
        }"#;
        let info: ShardInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.shardid, 17);
        let newest = info.intervals_newest_first();
        assert_eq!(newest[0].networkaddress, "node-a:9185");
        assert_eq!(newest[0].end_time, None);
    }

    #[test]
    fn test_blob_type_suffix() {
        let json = r#"{
            "parsedJson": {"deletable": false, "epoch": "3", "end_epoch": 53, "size": "1048576"},
            "sender": "0xabc",
            "type": "0x7e12::blob::Blob"
        }"#;
        let blob: BlobInfo = serde_json::from_str(json).unwrap();
        assert_eq!(blob.type_suffix(), "blob::Blob");
        let parsed = blob.parsed.unwrap();
        assert_eq!(parsed.epoch, Metric::Value(3));
        assert_eq!(parsed.size, Metric::Value(1_048_576));
        assert_eq!(BlobInfo::default().type_suffix(), "");
    }
}
