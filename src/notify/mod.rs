pub mod chat;
pub mod log;

pub use chat::{ChatConfig, ChatNotifier};
pub use log::LogNotifier;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("chat connection task has stopped")]
    Closed,

    #[error("not logged in to chat")]
    NotConnected,

    #[error("outbound chat queue is full")]
    QueueFull,
}

/// Destination for announcements. Delivery is fire-and-forget.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
