//! Per-view state.
//!
//! Each view owns the data it fetched and any fetch still in flight.
//! Leaving a view drops its state, which discards pending results, so a
//! late response never lands in a view that is no longer shown.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;

use crate::data::classify::HISTORY_PENDING_CRITICAL;
use crate::data::series::Series;
use crate::data::window::{apply, ordered, sort_by_timestamp};
use crate::data::{
    classify_owners, classify_pending, classify_row, classify_shard_health, classify_status,
    BlobInfo, Bucket, BucketCounts, NetworkConstants, OperatorRow, OperatorSample, OwnerBucket,
    Presentation, ShardHealthSample, ShardInfo, Timestamped, WindowChoice,
};
use crate::error::FetchError;
use crate::source::{Load, PendingFetch, StatsSource};

/// Shown when a shard search has no usable id.
pub const INVALID_SHARD_ID: &str = "Please enter a valid Shard ID!";

/// Shown when no shard has the searched id.
pub const SHARD_NOT_FOUND: &str = "Shard not found!";

/// Shown when a blob search is submitted empty.
pub const EMPTY_BLOB_ID: &str = "Please enter a Blob ID!";

fn spawn<T, F, Fut>(
    source: &Arc<dyn StatsSource>,
    runtime: &Handle,
    fetch: F,
) -> Option<PendingFetch<T>>
where
    T: Send + 'static,
    F: FnOnce(Arc<dyn StatsSource>) -> Fut,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
{
    Some(PendingFetch::spawn(runtime, fetch(Arc::clone(source))))
}

/// Take a finished result, clearing the pending slot.
fn take_result<T: Send + 'static>(
    pending: &mut Option<PendingFetch<T>>,
) -> Option<Result<T, FetchError>> {
    let result = pending.as_mut()?.poll()?;
    *pending = None;
    Some(result)
}

fn sorted<T: Timestamped>(mut records: Vec<T>) -> Vec<T> {
    sort_by_timestamp(&mut records);
    records
}

/// History blocks use the stricter pending threshold.
fn history_pending(sample: &OperatorSample) -> Bucket {
    classify_pending(sample.event_pending, HISTORY_PENDING_CRITICAL)
}

fn history_status(sample: &OperatorSample) -> Bucket {
    classify_status(sample.node_status.as_deref())
}

/// Operators table: latest values plus network constants.
#[derive(Debug)]
pub struct OperatorsState {
    pub rows: Load<Vec<OperatorRow>>,
    pub constants: Load<NetworkConstants>,
    /// Selected row, indexing the filtered rows.
    pub selected: usize,
    pending_rows: Option<PendingFetch<Vec<OperatorRow>>>,
    pending_constants: Option<PendingFetch<NetworkConstants>>,
}

impl OperatorsState {
    pub fn mount(source: &Arc<dyn StatsSource>, runtime: &Handle) -> Self {
        Self {
            rows: Load::Loading,
            constants: Load::Loading,
            selected: 0,
            pending_rows: spawn(source, runtime, |s| async move { s.latest_values().await }),
            pending_constants: spawn(source, runtime, |s| async move { s.constants().await }),
        }
    }

    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        if let Some(result) = take_result(&mut self.pending_rows) {
            self.rows.settle(result);
            changed = true;
        }
        if let Some(result) = take_result(&mut self.pending_constants) {
            self.constants.settle(result);
            changed = true;
        }
        changed
    }

    /// Rows matching the filter, in server order.
    pub fn filtered(&self, filter: &str) -> Vec<&OperatorRow> {
        self.rows
            .loaded()
            .map(|rows| rows.iter().filter(|r| r.matches(filter)).collect())
            .unwrap_or_default()
    }

    pub fn selected_row(&self, filter: &str) -> Option<&OperatorRow> {
        let rows = self.filtered(filter);
        let index = self.selected.min(rows.len().saturating_sub(1));
        rows.get(index).copied()
    }

    /// Timestamp of the first row, as the API sent it.
    pub fn last_updated(&self) -> Option<String> {
        self.rows.loaded()?.first()?.timestamp_text()
    }

    pub fn counts(&self) -> Option<BucketCounts> {
        Some(BucketCounts::tally(self.rows.loaded()?.iter().map(classify_row)))
    }
}

/// History of a single operator.
#[derive(Debug)]
pub struct HistoryState {
    pub endpoint: String,
    /// Sorted ascending on arrival.
    pub samples: Load<Vec<OperatorSample>>,
    pub window: WindowChoice,
    pub show_green: bool,
    pending: Option<PendingFetch<Vec<OperatorSample>>>,
}

impl HistoryState {
    pub fn mount(
        source: &Arc<dyn StatsSource>,
        runtime: &Handle,
        endpoint: String,
        window: WindowChoice,
        show_green: bool,
    ) -> Self {
        let query = endpoint.clone();
        let pending = spawn(source, runtime, move |s| async move {
            s.operator_history(&query).await
        });
        Self {
            endpoint,
            samples: Load::Loading,
            window,
            show_green,
            pending,
        }
    }

    pub fn poll(&mut self) -> bool {
        match take_result(&mut self.pending) {
            Some(result) => {
                self.samples.settle(result.map(sorted));
                true
            }
            None => false,
        }
    }

    pub fn window(&self, now: DateTime<Utc>) -> &[OperatorSample] {
        self.samples
            .loaded()
            .map(|samples| apply(samples, self.window.selector(), now))
            .unwrap_or(&[])
    }

    /// Node status blocks, newest first.
    pub fn status_strip(&self, now: DateTime<Utc>) -> Vec<Bucket> {
        self.strip(now, history_status)
    }

    /// Event pending blocks, newest first.
    pub fn pending_strip(&self, now: DateTime<Utc>) -> Vec<Bucket> {
        self.strip(now, history_pending)
    }

    fn strip(
        &self,
        now: DateTime<Utc>,
        classify: fn(&OperatorSample) -> Bucket,
    ) -> Vec<Bucket> {
        ordered(self.window(now), Presentation::Descending)
            .into_iter()
            .map(classify)
            .filter(|bucket| self.show_green || *bucket != Bucket::Ok)
            .collect()
    }

    /// Node status counts over the whole window, ignoring the green toggle.
    pub fn counts(&self, now: DateTime<Utc>) -> BucketCounts {
        BucketCounts::tally(self.window(now).iter().map(history_status))
    }

    /// Owned and ready shard counts, oldest first.
    pub fn series(&self, now: DateTime<Utc>) -> Vec<Series> {
        let window = self.window(now);
        vec![
            Series::from_window("Owned", window, |s| s.owned),
            Series::from_window("Shard ready", window, |s| s.shard_ready),
        ]
    }
}

/// Network shard health over time.
#[derive(Debug)]
pub struct ShardHealthState {
    /// Sorted ascending on arrival.
    pub samples: Load<Vec<ShardHealthSample>>,
    pub window: WindowChoice,
    pending: Option<PendingFetch<Vec<ShardHealthSample>>>,
}

impl ShardHealthState {
    pub fn mount(source: &Arc<dyn StatsSource>, runtime: &Handle, window: WindowChoice) -> Self {
        Self {
            samples: Load::Loading,
            window,
            pending: spawn(source, runtime, |s| async move { s.shard_health().await }),
        }
    }

    pub fn poll(&mut self) -> bool {
        match take_result(&mut self.pending) {
            Some(result) => {
                self.samples.settle(result.map(sorted));
                true
            }
            None => false,
        }
    }

    pub fn window(&self, now: DateTime<Utc>) -> &[ShardHealthSample] {
        self.samples
            .loaded()
            .map(|samples| apply(samples, self.window.selector(), now))
            .unwrap_or(&[])
    }

    /// Red, green and yellow shard counts, oldest first.
    pub fn series(&self, now: DateTime<Utc>) -> Vec<Series> {
        let window = self.window(now);
        vec![
            Series::from_window("Red", window, |s| s.redshards),
            Series::from_window("Green", window, |s| s.greenshards),
            Series::from_window("Yellow", window, |s| s.yellowshards),
        ]
    }

    pub fn latest(&self, now: DateTime<Utc>) -> Option<&ShardHealthSample> {
        self.window(now).last()
    }

    pub fn bucket(&self, now: DateTime<Utc>) -> Option<Bucket> {
        self.latest(now).map(classify_shard_health)
    }

    pub fn counts(&self, now: DateTime<Utc>) -> BucketCounts {
        BucketCounts::tally(self.window(now).iter().map(classify_shard_health))
    }
}

/// Owner bucket of a shard. A shard without an owner count lands in `Other`.
pub fn owner_bucket(shard: &ShardInfo) -> OwnerBucket {
    classify_owners(shard.owners.value().unwrap_or(0))
}

/// Shard ownership grid and search.
#[derive(Debug)]
pub struct ShardOwnersState {
    /// Sorted by shard id on arrival.
    pub shards: Load<Vec<ShardInfo>>,
    /// Grid cursor.
    pub selected: usize,
    /// Outcome of the last search: the id found, or why nothing was.
    pub search: Option<Result<u64, FetchError>>,
    pending: Option<PendingFetch<Vec<ShardInfo>>>,
}

impl ShardOwnersState {
    pub fn mount(source: &Arc<dyn StatsSource>, runtime: &Handle) -> Self {
        Self {
            shards: Load::Loading,
            selected: 0,
            search: None,
            pending: spawn(source, runtime, |s| async move { s.shard_info().await }),
        }
    }

    pub fn poll(&mut self) -> bool {
        match take_result(&mut self.pending) {
            Some(result) => {
                self.shards.settle(result.map(|mut shards| {
                    shards.sort_by_key(|s| s.shardid);
                    shards
                }));
                true
            }
            None => false,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.loaded().map_or(0, Vec::len)
    }

    pub fn selected_shard(&self) -> Option<&ShardInfo> {
        self.shards.loaded()?.get(self.selected)
    }

    /// Look up a shard by id and move the cursor onto it.
    pub fn search(&mut self, input: &str) -> Result<u64, FetchError> {
        let result = self.find(input.trim());
        self.search = Some(result.clone());
        result
    }

    fn find(&mut self, input: &str) -> Result<u64, FetchError> {
        let id: u64 = input
            .parse()
            .map_err(|_| FetchError::NotFound(INVALID_SHARD_ID.to_string()))?;
        let index = self
            .shards
            .loaded()
            .and_then(|shards| shards.binary_search_by_key(&id, |s| s.shardid).ok())
            .ok_or_else(|| FetchError::NotFound(SHARD_NOT_FOUND.to_string()))?;
        self.selected = index;
        Ok(id)
    }

    pub fn clear_search(&mut self) {
        self.search = None;
    }

    /// The shard found by the last successful search.
    pub fn found(&self) -> Option<&ShardInfo> {
        let id = *self.search.as_ref()?.as_ref().ok()?;
        let shards = self.shards.loaded()?;
        let index = shards.binary_search_by_key(&id, |s| s.shardid).ok()?;
        shards.get(index)
    }

    /// Ids of every shard currently held by an operator.
    pub fn shards_for_operator(&self, address: &str) -> Vec<u64> {
        self.shards
            .loaded()
            .map(|shards| {
                shards
                    .iter()
                    .filter(|s| s.networkaddress == address)
                    .map(|s| s.shardid)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Blob lookup. Nothing is fetched until an id is submitted.
#[derive(Debug, Default)]
pub struct BlobState {
    /// Id of the last submitted lookup.
    pub query: String,
    pub blob: Load<BlobInfo>,
    pending: Option<PendingFetch<BlobInfo>>,
}

impl BlobState {
    /// Start a lookup, replacing any still in flight.
    pub fn submit(&mut self, source: &Arc<dyn StatsSource>, runtime: &Handle, blob_id: &str) {
        let blob_id = blob_id.trim().to_string();
        if blob_id.is_empty() {
            self.query.clear();
            self.pending = None;
            self.blob = Load::Errored(FetchError::NotFound(EMPTY_BLOB_ID.to_string()));
            return;
        }
        self.query = blob_id.clone();
        self.blob = Load::Loading;
        self.pending = spawn(source, runtime, move |s| async move {
            s.blob_info(&blob_id).await
        });
    }

    pub fn poll(&mut self) -> bool {
        match take_result(&mut self.pending) {
            Some(result) => {
                self.blob.settle(result);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::window::count_presets;
    use crate::data::{Metric, WindowPreset, WindowSelector};
    use chrono::{TimeDelta, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 7, hour, 0, 0).unwrap()
    }

    fn sample(hour: u32, status: &str, pending: u64) -> OperatorSample {
        OperatorSample {
            timestamp: at(hour),
            node_status: Some(status.to_string()),
            event_pending: Metric::Value(pending),
            owned: Metric::Value(10),
            shard_ready: Metric::Value(9),
        }
    }

    fn history(samples: Vec<OperatorSample>) -> HistoryState {
        HistoryState {
            endpoint: "node-a:9185".to_string(),
            samples: Load::Loaded(sorted(samples)),
            window: WindowChoice::new(count_presets()),
            show_green: true,
            pending: None,
        }
    }

    fn shard(id: u64, address: &str, owners: u64) -> ShardInfo {
        ShardInfo {
            shardid: id,
            networkaddress: address.to_string(),
            nshards: Metric::Value(2),
            owners: Metric::Value(owners),
            network_address_intervals: Vec::new(),
        }
    }

    fn owners(shards: Vec<ShardInfo>) -> ShardOwnersState {
        ShardOwnersState {
            shards: Load::Loaded(shards),
            selected: 0,
            search: None,
            pending: None,
        }
    }

    #[test]
    fn test_history_strips_newest_first() {
        let state = history(vec![
            sample(11, "Down", 300),
            sample(9, "Active", 0),
            sample(10, "NA", 5),
        ]);
        let now = at(12);

        let statuses = [Bucket::Critical, Bucket::Unknown, Bucket::Ok];
        assert_eq!(state.status_strip(now), statuses);
        let pending = [Bucket::Critical, Bucket::Warning, Bucket::Ok];
        assert_eq!(state.pending_strip(now), pending);

        let series = state.series(now);
        assert_eq!(series[0].points.len(), 3);
        assert!(series[0].points[0].0 < series[0].points[2].0);
    }

    #[test]
    fn test_history_hides_green() {
        let mut state = history(vec![sample(9, "Active", 0), sample(10, "Down", 0)]);
        state.show_green = false;

        assert_eq!(state.status_strip(at(12)), vec![Bucket::Critical]);
        assert!(state.pending_strip(at(12)).is_empty());
        assert_eq!(state.counts(at(12)).ok, 1);
    }

    #[test]
    fn test_history_unloaded_is_empty() {
        let mut state = history(Vec::new());
        state.samples = Load::Loading;
        assert!(state.window(at(12)).is_empty());
        assert!(state.status_strip(at(12)).is_empty());
    }

    #[test]
    fn test_shard_health_latest_bucket() {
        let health = |hour, green, yellow| ShardHealthSample {
            timestamp: at(hour),
            redshards: Metric::Value(1000 - green - yellow),
            greenshards: Metric::Value(green),
            yellowshards: Metric::Value(yellow),
        };
        let six_hours = WindowPreset {
            label: "6h",
            selector: WindowSelector::Span(TimeDelta::hours(6)),
        };
        let state = ShardHealthState {
            samples: Load::Loaded(sorted(vec![health(10, 990, 0), health(2, 500, 100)])),
            window: WindowChoice::new(vec![six_hours]),
            pending: None,
        };

        assert_eq!(state.window(at(12)).len(), 1);
        assert_eq!(state.bucket(at(12)), Some(Bucket::Ok));
        assert_eq!(state.series(at(12)).len(), 3);
        assert_eq!(state.bucket(at(23)), None);
    }

    #[test]
    fn test_shard_search() {
        let mut state = owners(vec![
            shard(3, "node-a:9185", 1),
            shard(7, "node-b:9185", 2),
            shard(9, "node-a:9185", 5),
        ]);

        let invalid: Result<u64, FetchError> = Err(FetchError::NotFound(INVALID_SHARD_ID.into()));
        let missing: Result<u64, FetchError> = Err(FetchError::NotFound(SHARD_NOT_FOUND.into()));
        assert_eq!(state.search(""), invalid);
        assert_eq!(state.search("seven"), invalid);
        assert_eq!(state.search("8"), missing);
        assert!(state.found().is_none());

        assert_eq!(state.search(" 9 "), Ok(9));
        assert_eq!(state.selected, 2);
        let found = state.found().unwrap();
        assert_eq!(state.shards_for_operator(&found.networkaddress), vec![3, 9]);
        assert_eq!(owner_bucket(found), OwnerBucket::Other);

        state.clear_search();
        assert!(state.found().is_none());
    }

    #[test]
    fn test_shard_search_before_load() {
        let mut state = owners(Vec::new());
        state.shards = Load::Loading;
        let missing: Result<u64, FetchError> = Err(FetchError::NotFound(SHARD_NOT_FOUND.into()));
        assert_eq!(state.search("1"), missing);
        assert_eq!(state.shard_count(), 0);
    }

    #[test]
    fn test_owner_bucket_missing_count() {
        let mut info = shard(1, "node-a:9185", 1);
        assert_eq!(owner_bucket(&info), OwnerBucket::One);
        info.owners = Metric::Unavailable;
        assert_eq!(owner_bucket(&info), OwnerBucket::Other);
    }

    #[tokio::test]
    async fn test_empty_blob_id_clears_query() {
        #[derive(Debug)]
        struct Unused;

        #[async_trait::async_trait]
        impl StatsSource for Unused {
            async fn latest_values(&self) -> Result<Vec<OperatorRow>, FetchError> {
                unreachable!()
            }
            async fn constants(&self) -> Result<NetworkConstants, FetchError> {
                unreachable!()
            }
            async fn operator_history(&self, _: &str) -> Result<Vec<OperatorSample>, FetchError> {
                unreachable!()
            }
            async fn shard_health(&self) -> Result<Vec<ShardHealthSample>, FetchError> {
                unreachable!()
            }
            async fn shard_info(&self) -> Result<Vec<ShardInfo>, FetchError> {
                unreachable!()
            }
            async fn blob_info(&self, _: &str) -> Result<BlobInfo, FetchError> {
                unreachable!()
            }
            fn description(&self) -> &str {
                "unused"
            }
        }

        let source: Arc<dyn StatsSource> = Arc::new(Unused);
        let mut state = BlobState {
            query: "0xprevious".to_string(),
            ..BlobState::default()
        };
        state.submit(&source, &Handle::current(), "   ");

        let empty = FetchError::NotFound(EMPTY_BLOB_ID.to_string());
        assert_eq!(state.blob.error(), Some(&empty));
        assert_eq!(state.query, "");
        assert!(!state.poll());
    }
}
