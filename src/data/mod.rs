//! Data models and the windowing/classification pipeline.
//!
//! Raw API records are parsed into typed values, windowed by the user's
//! selection and classified into display buckets. Nothing here performs
//! I/O; fetching lives in [`crate::source`].
//!
//! ## Submodules
//!
//! - [`records`]: Record types for every endpoint, with lenient parsing
//! - [`window`]: Count and span windows over timestamp-sorted sequences
//! - [`classify`]: Threshold rules mapping raw fields to [`Bucket`]s
//! - [`series`]: Chart series derived from windowed records
//! - [`duration`]: Parsing and formatting of window spans (e.g., "24h", "5d")
//!
//! ## Data Flow
//!
//! ```text
//! JSON body (StatsSource)
//!        │
//!        ▼
//! records::* (sorted ascending on arrival)
//!        │
//!        ▼
//! window::apply(selector, now)  ──▶ contiguous suffix
//!        │
//!        ├──▶ classify::* (per record, per metric)
//!        │
//!        └──▶ series::* (chart points)
//! ```

pub mod classify;
pub mod duration;
pub mod records;
pub mod series;
pub mod window;

pub use classify::{
    classify_owners, classify_pending, classify_row, classify_shard_health, classify_status, Bucket,
    BucketCounts, OwnerBucket,
};
pub use records::{
    BlobInfo, Metric, NetworkConstants, OperatorRow, OperatorSample, OwnerInterval,
    ShardHealthSample, ShardInfo,
};
pub use window::{Presentation, Timestamped, WindowChoice, WindowPreset, WindowSelector};
