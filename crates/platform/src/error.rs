use std::time::Duration;

use thiserror::Error;

/// Errors returned by platform calls.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The call did not complete within the allowed duration.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The platform refused the call (missing rights, unknown chat, ...).
    #[error("rejected by platform: {0}")]
    Rejected(String),

    /// The platform asked us to slow down.
    #[error("rate limited")]
    RateLimited { retry_after: Option<Duration> },

    /// The response could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The client was given invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl PlatformError {
    /// Returns `true` if the error is transient and the call may succeed
    /// when repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(_) | Self::RateLimited { .. }
        )
    }
}
