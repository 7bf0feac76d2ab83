pub mod http;
pub mod provider;
pub mod snapshot;

pub use http::HttpSnapshotFetcher;
pub use provider::{FetchError, SnapshotFetcher};
pub use snapshot::Snapshot;
