//! Live source backed by the Walrus statistics HTTP API.
//!
//! The API is split over two hosts: the stats host serves operator history,
//! shard ownership and blob lookups; the network host serves the latest
//! operator values, constants and shard health.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::StatsSource;
use crate::data::{
    BlobInfo, NetworkConstants, OperatorRow, OperatorSample, ShardHealthSample, ShardInfo,
};
use crate::error::FetchError;

/// Default base URL of the stats host.
pub const DEFAULT_STATS_URL: &str = "https://walrus-stats.brightlystake.com";

/// Default base URL of the network host.
pub const DEFAULT_NETWORK_URL: &str = "https://walrus.brightlystake.com";

/// Source that fetches each endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    stats_url: String,
    network_url: String,
    description: String,
}

impl HttpSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::default()
    }

    pub fn stats_url(&self) -> &str {
        &self.stats_url
    }

    pub fn network_url(&self) -> &str {
        &self.network_url
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, FetchError> {
        debug!(what, "fetching");

        let response = request
            .send()
            .await
            .inspect_err(|e| warn!(what, error = %e, "request failed"))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(format!("{} not found", what)));
        }
        if !status.is_success() {
            warn!(what, %status, "non-success response");
            return Err(FetchError::Network(format!("API returned status {}", status)));
        }

        let body = response.bytes().await?;
        let parsed: T = serde_json::from_slice(&body)
            .inspect_err(|e| warn!(what, error = %e, "bad response body"))?;
        Ok(parsed)
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, FetchError> {
        // A missing list is a broken endpoint, not an empty lookup
        match self.fetch(request, what).await {
            Err(FetchError::NotFound(msg)) => Err(FetchError::Network(msg)),
            other => other,
        }
    }
}

#[async_trait]
impl StatsSource for HttpSource {
    async fn latest_values(&self) -> Result<Vec<OperatorRow>, FetchError> {
        let url = format!("{}/api/get_latest_values", self.network_url);
        self.fetch_list(self.client.get(url), "latest values").await
    }

    async fn constants(&self) -> Result<NetworkConstants, FetchError> {
        let url = format!("{}/api/walrus-constants", self.network_url);
        self.fetch_list(self.client.get(url), "constants").await
    }

    async fn operator_history(&self, endpoint: &str) -> Result<Vec<OperatorSample>, FetchError> {
        let url = format!("{}/api/operator-historic-stats", self.stats_url);
        let request = self.client.get(url).query(&[("x", endpoint)]);
        self.fetch_list(request, "operator history").await
    }

    async fn shard_health(&self) -> Result<Vec<ShardHealthSample>, FetchError> {
        let url = format!("{}/api/shard-health", self.network_url);
        self.fetch_list(self.client.get(url), "shard health").await
    }

    async fn shard_info(&self) -> Result<Vec<ShardInfo>, FetchError> {
        let url = format!("{}/api/shard-info", self.stats_url);
        self.fetch_list(self.client.get(url), "shard info").await
    }

    async fn blob_info(&self, blob_id: &str) -> Result<BlobInfo, FetchError> {
        let url = format!("{}/api2/get_blob_info", self.stats_url);
        let body = serde_json::json!({ "blobId": blob_id });
        let request = self.client.post(url).json(&body);
        self.fetch(request, &format!("Blob {}", blob_id)).await
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for HttpSource.
#[derive(Debug, Default)]
pub struct HttpSourceBuilder {
    stats_url: Option<String>,
    network_url: Option<String>,
}

impl HttpSourceBuilder {
    /// Set the stats host base URL (default: [`DEFAULT_STATS_URL`]).
    pub fn stats_url(mut self, url: impl Into<String>) -> Self {
        self.stats_url = Some(url.into());
        self
    }

    /// Set the network host base URL (default: [`DEFAULT_NETWORK_URL`]).
    pub fn network_url(mut self, url: impl Into<String>) -> Self {
        self.network_url = Some(url.into());
        self
    }

    /// Build the source. Requests use the transport's default timeouts.
    pub fn build(self) -> Result<HttpSource, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("walrus-watch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let stats_url = trim_base(self.stats_url.as_deref().unwrap_or(DEFAULT_STATS_URL));
        let network_url = trim_base(self.network_url.as_deref().unwrap_or(DEFAULT_NETWORK_URL));
        let description = format!("http: {}", stats_url);

        Ok(HttpSource {
            client,
            stats_url,
            network_url,
            description,
        })
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve a single canned response and hand back the raw request.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            if !name.eq_ignore_ascii_case("content-length") {
                                return None;
                            }
                            value.trim().parse::<usize>().ok()
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });

        (url, handle)
    }

    fn source_for(url: &str) -> HttpSource {
        HttpSource::builder()
            .stats_url(url)
            .network_url(url)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let source = HttpSource::builder().build().unwrap();
        assert_eq!(source.stats_url(), DEFAULT_STATS_URL);
        assert_eq!(source.network_url(), DEFAULT_NETWORK_URL);
        let description = format!("http: {}", DEFAULT_STATS_URL);
        assert_eq!(source.description(), description);
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let source = HttpSource::builder()
            .stats_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(source.stats_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_operator_history_sends_endpoint() {
        let body = r#"[
            {"timestamp": "2025-01-07 10:10:00", "node_status": "Active",
             "event_pending": 0, "owned": 5, "shard_ready": 5},
            {"timestamp": "2025-01-07 10:00:00", "node_status": "NA",
             "event_pending": "NA", "owned": 5, "shard_ready": 4}
        ]"#;
        let (url, server) = serve_once("200 OK", body).await;

        let source = source_for(&url);
        let samples = source.operator_history("node-a.example:9185").await;
        assert_eq!(samples.unwrap().len(), 2);

        let request = server.await.unwrap();
        let expected = "GET /api/operator-historic-stats?x=node-a.example%3A9185 ";
        assert!(request.starts_with(expected));
    }

    #[tokio::test]
    async fn test_non_success_is_network_error() {
        let (url, _server) = serve_once("502 Bad Gateway", "").await;
        let err = source_for(&url).shard_health().await.unwrap_err();
        let expected = FetchError::Network("API returned status 502 Bad Gateway".to_string());
        assert_eq!(err, expected);
    }

    #[tokio::test]
    async fn test_missing_list_endpoint_is_network_error() {
        let (url, _server) = serve_once("404 Not Found", "").await;
        let err = source_for(&url).shard_info().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[tokio::test]
    async fn test_bad_body_is_parse_error() {
        let (url, _server) = serve_once("200 OK", "<html>oops</html>").await;
        let err = source_for(&url).latest_values().await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_blob_lookup_posts_id() {
        let body = r#"{"parsedJson": {"deletable": true, "epoch": 2, "end_epoch": 10, "size": 512},
                       "sender": "0xfeed", "type": "0x1::blob::Blob"}"#;
        let (url, server) = serve_once("200 OK", body).await;

        let blob = source_for(&url).blob_info("abc123").await.unwrap();
        assert_eq!(blob.sender.as_deref(), Some("0xfeed"));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api2/get_blob_info "));
        assert!(request.contains(r#"{"blobId":"abc123"}"#));
    }

    #[tokio::test]
    async fn test_unknown_blob_is_not_found() {
        let (url, _server) = serve_once("404 Not Found", "").await;
        let err = source_for(&url).blob_info("missing").await.unwrap_err();
        let expected = FetchError::NotFound("Blob missing not found".to_string());
        assert_eq!(err, expected);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = source_for(&url).constants().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
