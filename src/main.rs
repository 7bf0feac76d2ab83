use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod announce;
mod config;
mod feed;
mod notify;
mod poll;

use config::Config;
use feed::HttpSnapshotFetcher;
use notify::{ChatNotifier, LogNotifier, Notifier};
use poll::PollLoop;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let fetcher = Arc::new(
        HttpSnapshotFetcher::new(&config.api_url, config.request_timeout())
            .context("Failed to set up snapshot fetcher")?,
    );
    info!("Polling {} every {:?}", config.api_url, config.poll_interval());

    let notifier: Arc<dyn Notifier> = if config.dry_run {
        info!("🟡 DRY RUN mode – announcements are only logged");
        Arc::new(LogNotifier)
    } else {
        let chat = config.chat()?;
        info!("Announcing to {} as {}", chat.channel, chat.nick);
        Arc::new(ChatNotifier::new(chat))
    };

    PollLoop::new(fetcher, notifier, config.poll_interval())
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
