use std::time::Duration;

use joingate_telegram::TelegramConfig;
use joingate_telegram::config::DEFAULT_API_URL;
use secrecy::SecretString;
use serde::Deserialize;

/// Telegram connection settings.
#[derive(Debug, Deserialize)]
pub struct BotConfig {
    /// Bot API token. Overridden by `JOINGATE_BOT_TOKEN`.
    pub token: Option<SecretString>,

    /// Base URL of the Bot API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Timeout of a single API request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// How long one `getUpdates` call may wait for new updates.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u64,

    /// Upper bound on updates handled concurrently.
    #[serde(default = "default_max_concurrent_updates")]
    pub max_concurrent_updates: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
            request_timeout_seconds: default_request_timeout(),
            poll_timeout_seconds: default_poll_timeout(),
            max_concurrent_updates: default_max_concurrent_updates(),
        }
    }
}

impl BotConfig {
    /// Client settings for the configured bot, or `None` without a token.
    pub fn telegram_config(&self) -> Option<TelegramConfig> {
        let token = self.token.clone()?;
        Some(
            TelegramConfig::from_secret(token)
                .with_api_url(self.api_url.as_str())
                .with_request_timeout(Duration::from_secs(self.request_timeout_seconds))
                .with_poll_timeout(Duration::from_secs(self.poll_timeout_seconds)),
        )
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_max_concurrent_updates() -> usize {
    64
}
