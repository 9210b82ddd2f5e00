//! Error types for fetching dashboard data.

use thiserror::Error;

/// Errors that can occur while fetching or looking up dashboard data.
///
/// None of these are fatal: each view catches them at its boundary and
/// shows the message until the user reloads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request failed or the server answered with a non-success status.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not valid JSON or did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A user lookup (shard id, blob id) matched nothing.
    #[error("{0}")]
    NotFound(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}
