use async_trait::async_trait;
use tracing::info;

use super::{Notifier, NotifyError};

/// Dry-run sink: announcements only go to the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        info!("[dry-run] {}", text);
        Ok(())
    }
}
