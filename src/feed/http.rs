use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::provider::{FetchError, SnapshotFetcher};
use super::snapshot::Snapshot;

/// Snapshot fetcher backed by the tracker server's live display endpoint.
pub struct HttpSnapshotFetcher {
    http: Client,
    url: String,
}

impl HttpSnapshotFetcher {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpSnapshotFetcher {
            http,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl SnapshotFetcher for HttpSnapshotFetcher {
    fn name(&self) -> &str {
        "live-display"
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        debug!("Fetching snapshot from {}", self.url);

        let resp = self.http.get(&self.url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        let raw: serde_json::Value = serde_json::from_str(&body)?;

        Snapshot::from_json(&raw).ok_or(FetchError::NotAnObject)
    }
}
