use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

/// Default Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Configuration for the Telegram client.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token issued by `@BotFather`.
    pub token: SecretString,

    /// Base URL of the Bot API, without a trailing slash.
    pub api_url: String,

    /// Timeout applied to every regular API call.
    pub request_timeout: Duration,

    /// Long-poll duration requested from `getUpdates`.
    pub poll_timeout: Duration,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("request_timeout", &self.request_timeout)
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}

impl TelegramConfig {
    /// Create a new configuration with the given bot token.
    pub fn new(token: impl Into<String>) -> Self {
        Self::from_secret(SecretString::new(token.into()))
    }

    /// Create a new configuration from an already wrapped token.
    pub fn from_secret(token: SecretString) -> Self {
        Self {
            token,
            api_url: DEFAULT_API_URL.to_owned(),
            request_timeout: Duration::from_secs(15),
            poll_timeout: Duration::from_secs(30),
        }
    }

    /// Point the client at a different Bot API server.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Set the per-call timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the long-poll duration.
    #[must_use]
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Full URL of a Bot API method. Contains the token; never log it.
    pub(crate) fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_url,
            self.token.expose_secret()
        )
    }
}
