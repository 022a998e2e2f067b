use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use joingate_core::{ChatRef, JoinTarget, UserId};
use joingate_crypto::TokenCodec;
use joingate_platform::DynPlatform;
use joingate_state::RecordStore;
use tracing::warn;

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::metrics::GatewayMetrics;
use crate::settings::{GateSettings, GateTexts};

/// Default number of join buttons per keyboard row.
pub const DEFAULT_BUTTONS_PER_ROW: usize = 2;

/// Default budget for the membership check behind a retry button.
///
/// Telegram shows a callback answer only if it arrives within a few seconds
/// of the press.
pub const DEFAULT_CALLBACK_DEADLINE: Duration = Duration::from_secs(10);

/// Fluent builder for constructing a [`Gateway`] instance.
///
/// A platform, a record store, a token codec, an archive chat and the bot
/// username are required. Targets and admins default to empty, texts to
/// [`GateTexts::default`].
pub struct GatewayBuilder {
    platform: Option<Arc<dyn DynPlatform>>,
    store: Option<Arc<dyn RecordStore>>,
    codec: Option<TokenCodec>,
    targets: Vec<JoinTarget>,
    admins: HashSet<UserId>,
    archive_chat: Option<ChatRef>,
    buttons_per_row: usize,
    bot_username: Option<String>,
    callback_deadline: Duration,
    texts: GateTexts,
    metrics: Option<Arc<GatewayMetrics>>,
}

impl GatewayBuilder {
    /// Create a new builder with all optional fields set to their defaults.
    pub fn new() -> Self {
        Self {
            platform: None,
            store: None,
            codec: None,
            targets: Vec::new(),
            admins: HashSet::new(),
            archive_chat: None,
            buttons_per_row: DEFAULT_BUTTONS_PER_ROW,
            bot_username: None,
            callback_deadline: DEFAULT_CALLBACK_DEADLINE,
            texts: GateTexts::default(),
            metrics: None,
        }
    }

    /// Set the platform client.
    #[must_use]
    pub fn platform(mut self, platform: Arc<dyn DynPlatform>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Set the record store implementation.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the codec used to issue and resolve tokens.
    #[must_use]
    pub fn codec(mut self, codec: TokenCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Replace the join targets.
    #[must_use]
    pub fn targets(mut self, targets: Vec<JoinTarget>) -> Self {
        self.targets = targets;
        self
    }

    /// Append a single join target.
    #[must_use]
    pub fn target(mut self, target: JoinTarget) -> Self {
        self.targets.push(target);
        self
    }

    /// Add operators allowed to archive media.
    #[must_use]
    pub fn admins(mut self, admins: impl IntoIterator<Item = UserId>) -> Self {
        self.admins.extend(admins);
        self
    }

    /// Set the archive chat.
    #[must_use]
    pub fn archive_chat(mut self, chat: ChatRef) -> Self {
        self.archive_chat = Some(chat);
        self
    }

    /// Set the number of join buttons per keyboard row.
    #[must_use]
    pub fn buttons_per_row(mut self, n: usize) -> Self {
        self.buttons_per_row = n;
        self
    }

    /// Set the bot username used in deep links.
    #[must_use]
    pub fn bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Bound the membership check run for a retry button press.
    #[must_use]
    pub fn callback_deadline(mut self, deadline: Duration) -> Self {
        self.callback_deadline = deadline;
        self
    }

    /// Replace the user-facing texts.
    #[must_use]
    pub fn texts(mut self, texts: GateTexts) -> Self {
        self.texts = texts;
        self
    }

    /// Share a metrics instance with the caller.
    #[must_use]
    pub fn metrics(mut self, metrics: Arc<GatewayMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Consume the builder and produce a configured [`Gateway`].
    ///
    /// Returns a [`GatewayError::Configuration`] if a required field has not
    /// been set.
    pub fn build(self) -> Result<Gateway, GatewayError> {
        let platform = self
            .platform
            .ok_or_else(|| GatewayError::Configuration("platform is required".into()))?;
        let store = self
            .store
            .ok_or_else(|| GatewayError::Configuration("record store is required".into()))?;
        let codec = self
            .codec
            .ok_or_else(|| GatewayError::Configuration("token codec is required".into()))?;
        let archive_chat = self
            .archive_chat
            .ok_or_else(|| GatewayError::Configuration("archive chat is required".into()))?;
        let bot_username = self
            .bot_username
            .map(|u| u.trim_start_matches('@').to_owned())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| GatewayError::Configuration("bot username is required".into()))?;

        for target in self.targets.iter().filter(|t| !t.is_checkable()) {
            warn!(
                join_target = %target,
                "membership cannot be verified for this join target; the gate will stay closed"
            );
        }

        Ok(Gateway {
            platform,
            store,
            codec,
            settings: GateSettings {
                targets: self.targets,
                admins: self.admins,
                archive_chat,
                buttons_per_row: self.buttons_per_row.max(1),
                bot_username,
                callback_deadline: self.callback_deadline,
                texts: self.texts,
            },
            metrics: self.metrics.unwrap_or_default(),
        })
    }
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
