use clap::Parser;
use std::time::Duration;
use url::Url;

use crate::notify::ChatConfig;

/// Live match score announcer for a chat channel
#[derive(Parser, Debug, Clone)]
#[command(name = "livescore-announcer", version, about)]
pub struct Config {
    /// Log announcements instead of sending them to chat
    #[arg(long, env = "DRY_RUN", default_value = "false")]
    pub dry_run: bool,

    /// Live match snapshot endpoint
    #[arg(
        long,
        env = "API_URL",
        default_value = "http://localhost:3000/api/display/live"
    )]
    pub api_url: String,

    /// Seconds between polls
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value = "10")]
    pub poll_interval_secs: u64,

    /// Per-request timeout for the snapshot endpoint, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "5")]
    pub request_timeout_secs: u64,

    /// Chat WebSocket gateway
    #[arg(
        long,
        env = "CHAT_URL",
        default_value = "wss://irc-ws.chat.twitch.tv:443"
    )]
    pub chat_url: String,

    /// Channel to announce in
    #[arg(long, env = "CHAT_CHANNEL")]
    pub chat_channel: Option<String>,

    /// Login name of the announcing account
    #[arg(long, env = "CHAT_NICK")]
    pub chat_nick: Option<String>,

    /// OAuth token of the announcing account (the `oauth:` prefix is optional)
    #[arg(long, env = "CHAT_TOKEN", hide_env_values = true)]
    pub chat_token: Option<String>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be at least 1");
        }
        if self.request_timeout_secs >= self.poll_interval_secs {
            anyhow::bail!(
                "request_timeout_secs ({}) must be shorter than poll_interval_secs ({})",
                self.request_timeout_secs,
                self.poll_interval_secs
            );
        }

        let api = Url::parse(&self.api_url)
            .map_err(|e| anyhow::anyhow!("API_URL '{}' is not a valid URL: {}", self.api_url, e))?;
        if !matches!(api.scheme(), "http" | "https") {
            anyhow::bail!("API_URL must be http(s), got '{}'", api.scheme());
        }

        if !self.dry_run {
            let chat = Url::parse(&self.chat_url).map_err(|e| {
                anyhow::anyhow!("CHAT_URL '{}' is not a valid URL: {}", self.chat_url, e)
            })?;
            if !matches!(chat.scheme(), "ws" | "wss") {
                anyhow::bail!("CHAT_URL must be ws(s), got '{}'", chat.scheme());
            }
            for (name, value) in [
                ("CHAT_CHANNEL", &self.chat_channel),
                ("CHAT_NICK", &self.chat_nick),
                ("CHAT_TOKEN", &self.chat_token),
            ] {
                if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                    anyhow::bail!("{} is required unless --dry-run is set", name);
                }
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Chat settings; errors if any credential is missing.
    pub fn chat(&self) -> anyhow::Result<ChatConfig> {
        let required = |name: &str, value: &Option<String>| {
            value
                .clone()
                .ok_or_else(|| anyhow::anyhow!("{} is not set", name))
        };
        Ok(ChatConfig {
            url: self.chat_url.clone(),
            channel: required("CHAT_CHANNEL", &self.chat_channel)?,
            nick: required("CHAT_NICK", &self.chat_nick)?,
            token: required("CHAT_TOKEN", &self.chat_token)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["livescore-announcer"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    fn live_args() -> Vec<&'static str> {
        vec![
            "--chat-channel",
            "casters",
            "--chat-nick",
            "scorebot",
            "--chat-token",
            "oauth:abc",
        ]
    }

    #[test]
    fn test_defaults() {
        let cfg = parse(&["--dry-run"]);
        assert_eq!(cfg.poll_interval(), Duration::from_secs(10));
        assert_eq!(cfg.api_url, "http://localhost:3000/api/display/live");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_live_mode_requires_credentials() {
        let cfg = parse(&["--chat-channel", "casters"]);
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("CHAT_NICK"), "{}", err);

        let cfg = parse(&live_args());
        assert!(cfg.validate().is_ok());
        let chat = cfg.chat().unwrap();
        assert_eq!(chat.channel, "casters");
        assert_eq!(chat.url, "wss://irc-ws.chat.twitch.tv:443");
    }

    #[test]
    fn test_timeout_must_fit_in_interval() {
        let cfg = parse(&["--dry-run", "--poll-interval-secs", "5", "--request-timeout-secs", "5"]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_urls() {
        let cfg = parse(&["--dry-run", "--api-url", "localhost:3000/api"]);
        assert!(cfg.validate().is_err());

        let mut args = live_args();
        args.extend(["--chat-url", "https://irc.example.com"]);
        assert!(parse(&args).validate().is_err());
    }
}
