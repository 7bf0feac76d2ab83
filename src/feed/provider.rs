use async_trait::async_trait;
use thiserror::Error;

use super::snapshot::Snapshot;

/// Why a cycle got no snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("feed request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("feed answered HTTP {0}")]
    Status(u16),

    #[error("feed body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feed payload is not a JSON object")]
    NotAnObject,
}

impl FetchError {
    /// The feed answers 404 while no match is queued; that is not worth a warning.
    pub fn is_idle(&self) -> bool {
        matches!(self, FetchError::Status(404))
    }
}

/// Source of match-state snapshots, polled once per cycle.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
