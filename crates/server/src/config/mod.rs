mod bot;
mod gate;
mod logging;
mod state;


pub use bot::*;
pub use gate::*;
pub use logging::*;
pub use state::*;

use std::path::Path;

use joingate_gateway::GateTexts;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Environment variable overriding `bot.token`.
pub const BOT_TOKEN_ENV: &str = "JOINGATE_BOT_TOKEN";

/// Environment variable overriding `gate.secret_key`.
pub const SECRET_KEY_ENV: &str = "JOINGATE_SECRET_KEY";

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level configuration for the joingate bot, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct JoingateConfig {
    /// Telegram connection.
    #[serde(default)]
    pub bot: BotConfig,
    /// Join targets, operators and token signing.
    #[serde(default)]
    pub gate: GateConfig,
    /// User-facing message templates.
    #[serde(default)]
    pub texts: GateTexts,
    /// Record store backend.
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl JoingateConfig {
    /// Parse configuration from TOML text. Environment overrides are not
    /// applied.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from `path`, or use defaults if the file does not
    /// exist, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_toml(&contents)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Replace secrets with values found through `lookup`. Blank values are
    /// ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(token) = read(BOT_TOKEN_ENV) {
            self.bot.token = Some(SecretString::new(token));
        }
        if let Some(secret) = read(SECRET_KEY_ENV) {
            self.gate.secret_key = Some(SecretString::new(secret));
        }
    }

    /// Check that everything required to run the bot is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_set(self.bot.token.as_ref()) {
            return Err(ConfigError::Missing("bot.token"));
        }
        if !is_set(self.gate.secret_key.as_ref()) {
            return Err(ConfigError::Missing("gate.secret_key"));
        }
        if self.gate.archive_chat.is_none() {
            return Err(ConfigError::Missing("gate.archive_chat"));
        }
        if self.gate.buttons_per_row == 0 {
            return Err(ConfigError::Invalid {
                field: "gate.buttons_per_row",
                reason: "must be at least 1".into(),
            });
        }
        if self.gate.callback_deadline_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "gate.callback_deadline_seconds",
                reason: "must be at least 1".into(),
            });
        }
        if self.bot.max_concurrent_updates == 0 {
            return Err(ConfigError::Invalid {
                field: "bot.max_concurrent_updates",
                reason: "must be at least 1".into(),
            });
        }
        match self.state.backend.as_str() {
            "memory" => {}
            "redis" if self.state.url.is_none() => return Err(ConfigError::Missing("state.url")),
            "redis" => {}
            other => {
                return Err(ConfigError::Invalid {
                    field: "state.backend",
                    reason: format!("unknown backend \"{other}\", expected memory or redis"),
                });
            }
        }
        Ok(())
    }
}

fn is_set(secret: Option<&SecretString>) -> bool {
    secret.is_some_and(|s| !s.expose_secret().trim().is_empty())
}
