use crate::config::ConfigError;

/// Errors that stop the server from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("state error: {0}")]
    State(#[from] joingate_state::StateError),

    #[error("platform error: {0}")]
    Platform(#[from] joingate_platform::PlatformError),

    #[error("telegram error: {0}")]
    Telegram(#[from] joingate_telegram::TelegramError),

    #[error("gateway error: {0}")]
    Gateway(#[from] joingate_gateway::GatewayError),

    #[error("token error: {0}")]
    Token(#[from] joingate_crypto::TokenError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
