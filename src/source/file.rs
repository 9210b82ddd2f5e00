//! File-based data source.
//!
//! Replays saved API responses from a directory. Useful offline and for
//! reproducing what the dashboard showed at some point in time.
//!
//! ```text
//! <dir>/latest_values.json
//! <dir>/walrus_constants.json
//! <dir>/shard_health.json
//! <dir>/shard_info.json
//! <dir>/operator_history/<endpoint>.json   (':' and '/' replaced by '_')
//! <dir>/blobs/<blob id>.json
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::StatsSource;
use crate::data::{
    BlobInfo, NetworkConstants, OperatorRow, OperatorSample, ShardHealthSample, ShardInfo,
};
use crate::error::FetchError;

/// A data source that reads API responses from JSON files.
#[derive(Debug)]
pub struct FileSource {
    dir: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source rooted at the given directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let description = format!("replay: {}", dir.display());
        Self { dir, description }
    }

    /// Returns the directory being replayed.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the saved history for an operator endpoint.
    pub fn history_path(&self, endpoint: &str) -> PathBuf {
        let file = format!("{}.json", sanitize(endpoint));
        self.dir.join("operator_history").join(file)
    }

    async fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T, FetchError> {
        debug!(path = %path.display(), "reading");
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| FetchError::Network(format!("Read error: {}: {}", path.display(), e)))?;
        Ok(serde_json::from_slice(&content)?)
    }
}

fn sanitize(name: &str) -> String {
    name.replace([':', '/', '\\'], "_")
}

#[async_trait]
impl StatsSource for FileSource {
    async fn latest_values(&self) -> Result<Vec<OperatorRow>, FetchError> {
        self.read(&self.dir.join("latest_values.json")).await
    }

    async fn constants(&self) -> Result<NetworkConstants, FetchError> {
        self.read(&self.dir.join("walrus_constants.json")).await
    }

    async fn operator_history(&self, endpoint: &str) -> Result<Vec<OperatorSample>, FetchError> {
        self.read(&self.history_path(endpoint)).await
    }

    async fn shard_health(&self) -> Result<Vec<ShardHealthSample>, FetchError> {
        self.read(&self.dir.join("shard_health.json")).await
    }

    async fn shard_info(&self) -> Result<Vec<ShardInfo>, FetchError> {
        self.read(&self.dir.join("shard_info.json")).await
    }

    async fn blob_info(&self, blob_id: &str) -> Result<BlobInfo, FetchError> {
        let file = format!("{}.json", sanitize(blob_id));
        let path = self.dir.join("blobs").join(file);
        match tokio::fs::metadata(&path).await {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(FetchError::NotFound(format!("Blob {} not found", blob_id)))
            }
            _ => self.read(&path).await,
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let health = r#"[{
            "timestamp": "2025-01-07 10:00:00",
            "redshards": 1,
            "greenshards": 990,
            "yellowshards": 9
        }]"#;
        write(dir.path(), "shard_health.json", health);

        let history_dir = dir.path().join("operator_history");
        fs::create_dir(&history_dir).unwrap();
        let history = r#"[{
            "timestamp": "2025-01-07 10:00:00",
            "node_status": "Active",
            "event_pending": 0
        }]"#;
        write(&history_dir, "node-a.example_9185.json", history);

        write(dir.path(), "latest_values.json", "{ not json");
        dir
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/replay");
        assert_eq!(source.dir(), Path::new("/tmp/replay"));
        assert_eq!(source.description(), "replay: /tmp/replay");
        assert_eq!(
            source.history_path("node-a:9185"),
            Path::new("/tmp/replay/operator_history/node-a_9185.json")
        );
    }

    #[tokio::test]
    async fn test_reads_saved_responses() {
        let dir = fixture();
        let source = FileSource::new(dir.path());

        let health = source.shard_health().await.unwrap();
        assert_eq!(health.len(), 1);

        let endpoint = "node-a.example:9185";
        let history = source.operator_history(endpoint).await.unwrap();
        assert_eq!(history[0].node_status.as_deref(), Some("Active"));
    }

    #[tokio::test]
    async fn test_missing_file_is_network_error() {
        let dir = fixture();
        let source = FileSource::new(dir.path());
        let err = source.shard_info().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(ref msg) if msg.contains("Read error")));
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let dir = fixture();
        let source = FileSource::new(dir.path());
        assert!(matches!(source.latest_values().await, Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_blob_is_not_found() {
        let dir = fixture();
        let source = FileSource::new(dir.path());
        let err = source.blob_info("deadbeef").await.unwrap_err();
        let expected = FetchError::NotFound("Blob deadbeef not found".to_string());
        assert_eq!(err, expected);
    }
}
