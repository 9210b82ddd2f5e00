//! # walrus-watch
//!
//! A terminal dashboard and library for watching a Walrus storage network.
//!
//! It polls the stats API for operator status, per-operator history,
//! network shard health, shard ownership and blob metadata, windows the
//! time series by the user's selection and classifies every record into a
//! display bucket (ok, unknown, warning, critical).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │  app    │───▶│  state   │───▶│   ui    │───▶│ Terminal │  │
//! │  │ (views) │    │ (per view)    │(rendering)   │          │  │
//! │  └────┬────┘    └────┬─────┘    └─────────┘    └──────────┘  │
//! │       │              │                                       │
//! │       ▼              ▼                                       │
//! │  ┌─────────┐    ┌──────────┐                                 │
//! │  │ source  │    │   data   │  window ▸ classify ▸ series     │
//! │  │ (fetch) │    │ (pure)   │                                 │
//! │  └─────────┘    └──────────┘                                 │
//! │   HttpSource | FileSource                                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: View navigation, input handling and fetch lifecycle
//! - **[`state`]**: What each view holds while it is mounted
//! - **[`source`]**: The [`StatsSource`] trait, with [`HttpSource`] for the
//!   live API and [`FileSource`] for saved responses
//! - **[`data`]**: Record types, windowing, classification and chart series
//! - **[`ui`]**: Terminal rendering using ratatui
//! - **[`config`]**: Layered settings (defaults, TOML file, environment)
//! - **[`export`]**: JSON snapshot of the classified dashboard
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the public stats API
//! walrus-watch
//!
//! # Open straight into one operator's history
//! walrus-watch --operator https://node.example.com:9185
//!
//! # Replay saved responses and write a snapshot without the TUI
//! walrus-watch --replay ./captures --export snapshot.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use walrus_watch::data::classify_row;
//! use walrus_watch::{HttpSource, StatsSource};
//!
//! # tokio_test::block_on(async {
//! let source = HttpSource::builder().build().unwrap();
//! for row in source.latest_values().await.unwrap() {
//!     println!("{:?} {}", row.endpoint(), classify_row(&row).label());
//! }
//! # });
//! ```
//!
//! ### Windowing a series
//!
//! ```
//! use chrono::Utc;
//! use walrus_watch::data::window::apply;
//! use walrus_watch::data::WindowSelector;
//! use walrus_watch::ShardHealthSample;
//!
//! let samples: Vec<ShardHealthSample> = Vec::new();
//! let recent = apply(&samples, WindowSelector::Count(10), Utc::now());
//! assert!(recent.is_empty());
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod source;
pub mod state;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::Settings;
pub use data::{
    BlobInfo, Bucket, BucketCounts, Metric, NetworkConstants, OperatorRow, OperatorSample,
    OwnerBucket, ShardHealthSample, ShardInfo, WindowSelector,
};
pub use error::FetchError;
pub use export::Report;
pub use source::{FileSource, HttpSource, Load, PendingFetch, StatsSource};
