//! Chat notifier speaking Twitch-style IRC over a WebSocket.
//!
//! ```text
//!  PollLoop ──send()──▶ mpsc queue ──▶ connection task ──PRIVMSG──▶ chat server
//!                                          │  PASS / NICK / JOIN on connect
//!                                          │  PING → PONG
//!                                          └─ reconnect with jittered backoff
//! ```
//!
//! `send()` only enqueues, so a slow or dead chat connection never stalls a
//! poll cycle. While the session is not logged in, `send()` is refused and
//! anything still queued from the previous session is discarded on the next
//! login, so an outage never replays old scores. Delivery is at-most-once.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

use super::{Notifier, NotifyError};

const QUEUE_CAPACITY: usize = 64;
const MAX_BACKOFF_SECS: u64 = 30;
const MAX_JITTER_MS: u64 = 500;

/// Connection settings for the chat server.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// WebSocket URL of the IRC gateway (wss://...)
    pub url: String,
    /// Channel to announce in, with or without the leading `#`
    pub channel: String,
    /// Login name of the announcing account
    pub nick: String,
    /// OAuth token, with or without the `oauth:` prefix
    pub token: String,
}

pub struct ChatNotifier {
    channel: String,
    queue: mpsc::Sender<String>,
    /// Set by the connection task once the server welcomed us, cleared on disconnect.
    connected: Arc<AtomicBool>,
}

impl ChatNotifier {
    /// Create the notifier and spawn the background connection task.
    pub fn new(config: ChatConfig) -> Self {
        let (queue, rx) = mpsc::channel(QUEUE_CAPACITY);
        let channel = normalize_channel(&config.channel);
        let connected = Arc::new(AtomicBool::new(false));

        let task_channel = channel.clone();
        let task_connected = Arc::clone(&connected);
        tokio::spawn(async move {
            chat_connection_loop(&config, &task_channel, rx, &task_connected).await;
        });

        ChatNotifier {
            channel,
            queue,
            connected,
        }
    }
}

#[async_trait]
impl Notifier for ChatNotifier {
    fn name(&self) -> &str {
        &self.channel
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(NotifyError::NotConnected);
        }
        self.queue
            .try_send(privmsg_line(&self.channel, text))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => NotifyError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => NotifyError::Closed,
            })
    }
}

/// Persistent chat connection with auto-reconnect and exponential backoff.
/// Backoff only resets after a successful login. Returns once every sender
/// has been dropped.
async fn chat_connection_loop(
    config: &ChatConfig,
    channel: &str,
    mut outbound: mpsc::Receiver<String>,
    connected: &AtomicBool,
) {
    let mut backoff_secs = 1u64;

    loop {
        info!("[{}] Connecting to chat: {}", channel, config.url);

        match tokio_tungstenite::connect_async(config.url.as_str()).await {
            Ok((ws_stream, _response)) => {
                info!("[{}] Chat socket connected, logging in", channel);

                let (mut write, mut read) = ws_stream.split();

                let mut login_ok = true;
                for line in login_lines(&config.token, &config.nick, channel) {
                    if let Err(e) = write.send(Message::Text(line)).await {
                        error!("[{}] Failed to send login: {}", channel, e);
                        login_ok = false;
                        break;
                    }
                }

                if login_ok {
                    let mut logged_in = false;
                    loop {
                        tokio::select! {
                            msg = read.next() => {
                                match msg {
                                    Some(Ok(Message::Text(text))) => {
                                        let mut alive = true;
                                        for line in text.lines() {
                                            match classify_line(line) {
                                                ServerLine::Ping(pong) => {
                                                    if let Err(e) = write.send(Message::Text(pong)).await {
                                                        error!("[{}] PONG failed: {}", channel, e);
                                                        alive = false;
                                                        break;
                                                    }
                                                }
                                                ServerLine::Welcome => {
                                                    let stale = discard_backlog(&mut outbound);
                                                    if stale > 0 {
                                                        warn!("[{}] Dropped {} announcement(s) queued before reconnect", channel, stale);
                                                    }
                                                    logged_in = true;
                                                    connected.store(true, Ordering::Release);
                                                    backoff_secs = 1;
                                                    info!("[{}] Logged in to chat", channel);
                                                }
                                                ServerLine::LoginFailed => {
                                                    error!("[{}] Chat login rejected: {}", channel, line.trim());
                                                    alive = false;
                                                    break;
                                                }
                                                ServerLine::Other => {}
                                            }
                                        }
                                        if !alive {
                                            break;
                                        }
                                    }
                                    Some(Ok(Message::Ping(data))) => {
                                        if let Err(e) = write.send(Message::Pong(data)).await {
                                            error!("[{}] Pong frame failed: {}", channel, e);
                                            break;
                                        }
                                    }
                                    Some(Ok(Message::Close(_))) => {
                                        warn!("[{}] Chat server closed the socket", channel);
                                        break;
                                    }
                                    Some(Err(e)) => {
                                        error!("[{}] Chat socket error: {}", channel, e);
                                        break;
                                    }
                                    None => {
                                        warn!("[{}] Chat stream ended", channel);
                                        break;
                                    }
                                    _ => {}
                                }
                            }
                            line = outbound.recv(), if logged_in => {
                                let Some(line) = line else {
                                    info!("[{}] Notifier dropped, closing chat socket", channel);
                                    let _ = write.send(Message::Close(None)).await;
                                    return;
                                };
                                if let Err(e) = write.send(Message::Text(line)).await {
                                    error!("[{}] Failed to deliver announcement: {}", channel, e);
                                    break;
                                }
                            }
                        }
                    }
                }
            }
            Err(e) => {
                error!("[{}] Chat connection failed: {}", channel, e);
            }
        }

        connected.store(false, Ordering::Release);
        let jitter = rand::thread_rng().gen_range(0..=MAX_JITTER_MS);
        warn!("[{}] Reconnecting in {}s...", channel, backoff_secs);
        tokio::time::sleep(Duration::from_secs(backoff_secs) + Duration::from_millis(jitter)).await;
        backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
    }
}

/// Throw away lines queued for a session that no longer exists.
fn discard_backlog(outbound: &mut mpsc::Receiver<String>) -> usize {
    let mut dropped = 0;
    while outbound.try_recv().is_ok() {
        dropped += 1;
    }
    dropped
}

// ── Line framing ─────────────────────────────────────────────────────────────

/// `#name`, lower-cased, from `Name` or `#Name`.
fn normalize_channel(channel: &str) -> String {
    format!("#{}", channel.trim().trim_start_matches('#').to_lowercase())
}

fn login_lines(token: &str, nick: &str, channel: &str) -> Vec<String> {
    let token = token.trim();
    let token = token.strip_prefix("oauth:").unwrap_or(token);
    vec![
        format!("PASS oauth:{}", token),
        format!("NICK {}", nick.trim().to_lowercase()),
        format!("JOIN {}", channel),
    ]
}

/// IRC lines end at CR/LF, so embedded newlines would split a message.
fn privmsg_line(channel: &str, text: &str) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    format!("PRIVMSG {} :{}", channel, flat)
}

#[derive(Debug, PartialEq, Eq)]
enum ServerLine {
    /// Keepalive; carries the PONG to answer with.
    Ping(String),
    /// `001` numeric: login accepted.
    Welcome,
    LoginFailed,
    Other,
}

fn classify_line(line: &str) -> ServerLine {
    let line = line.trim_end();
    if let Some(rest) = line.strip_prefix("PING") {
        return ServerLine::Ping(format!("PONG{}", rest));
    }
    if line.contains("NOTICE") && line.contains("Login authentication failed") {
        return ServerLine::LoginFailed;
    }
    if line.split(' ').nth(1) == Some("001") {
        return ServerLine::Welcome;
    }
    ServerLine::Other
}
