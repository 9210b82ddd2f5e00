//! Data source abstraction for fetching dashboard data.
//!
//! Every view pulls its records through the [`StatsSource`] trait, so the
//! TUI runs the same against the live API ([`HttpSource`]) or against a
//! directory of saved responses ([`FileSource`]).
//!
//! Fetches are fire-and-forget tasks wrapped in a [`PendingFetch`], which the
//! UI loop polls without blocking. Each view tracks its data with [`Load`].

mod file;
mod http;
mod load;

pub use file::FileSource;
pub use http::{HttpSource, HttpSourceBuilder, DEFAULT_NETWORK_URL, DEFAULT_STATS_URL};
pub use load::{Load, PendingFetch};

use std::fmt::Debug;

use async_trait::async_trait;

use crate::data::{
    BlobInfo, NetworkConstants, OperatorRow, OperatorSample, ShardHealthSample, ShardInfo,
};
use crate::error::FetchError;

/// Trait for fetching dashboard data from various backends.
///
/// Each method performs exactly one request and returns records in the
/// order the backend sent them; callers sort on arrival. There is no retry.
///
/// # Example
///
/// ```no_run
/// use walrus_watch::{HttpSource, StatsSource};
///
/// # tokio_test::block_on(async {
/// let source = HttpSource::builder().build().unwrap();
/// let rows = source.latest_values().await.unwrap();
/// println!("Got {} operators", rows.len());
/// # });
/// ```
#[async_trait]
pub trait StatsSource: Send + Sync + Debug {
    /// Latest status row of every operator.
    async fn latest_values(&self) -> Result<Vec<OperatorRow>, FetchError>;

    /// Network-wide constants.
    async fn constants(&self) -> Result<NetworkConstants, FetchError>;

    /// Full recorded history of one operator, identified by its endpoint.
    async fn operator_history(&self, endpoint: &str) -> Result<Vec<OperatorSample>, FetchError>;

    /// Network shard health counters over time.
    async fn shard_health(&self) -> Result<Vec<ShardHealthSample>, FetchError>;

    /// Current and historic owners of every shard.
    async fn shard_info(&self) -> Result<Vec<ShardInfo>, FetchError>;

    /// Look up a blob by id.
    async fn blob_info(&self, blob_id: &str) -> Result<BlobInfo, FetchError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
