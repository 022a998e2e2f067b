use std::time::Duration;

use joingate_platform::PlatformError;
use thiserror::Error;

/// Errors specific to the Telegram client.
///
/// These are internal errors that get converted into [`PlatformError`] at the
/// public API boundary.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// An HTTP-level transport error occurred. The URL (which embeds the bot
    /// token) is stripped before the error is stored.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The request did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The Bot API answered with `ok: false`.
    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },

    /// HTTP 429 or `error_code` 429.
    #[error("rate limited by Telegram")]
    RateLimited { retry_after: Option<Duration> },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The HTTP client could not be built.
    #[error("client setup failed: {0}")]
    Setup(String),
}

impl TelegramError {
    /// Classify a transport error, dropping its URL.
    pub(crate) fn transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Http(err.without_url())
        }
    }
}

impl From<TelegramError> for PlatformError {
    fn from(err: TelegramError) -> Self {
        match err {
            TelegramError::Http(e) => PlatformError::Connection(e.to_string()),
            TelegramError::Timeout(d) => PlatformError::Timeout(d),
            TelegramError::Api { code, description } => {
                PlatformError::Rejected(format!("{code}: {description}"))
            }
            TelegramError::RateLimited { retry_after } => {
                PlatformError::RateLimited { retry_after }
            }
            TelegramError::Decode(msg) => PlatformError::Serialization(msg),
            TelegramError::Setup(msg) => PlatformError::Configuration(msg),
        }
    }
}
