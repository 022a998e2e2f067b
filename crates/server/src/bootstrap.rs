use std::sync::Arc;

use joingate_crypto::TokenCodec;
use joingate_gateway::{Gateway, GatewayBuilder};
use joingate_platform::DynPlatform;
use joingate_state::RecordStore;
use tracing::info;

use crate::config::{ConfigError, JoingateConfig};
use crate::error::ServerError;

/// Assemble a [`Gateway`] from configuration and live handles.
///
/// The deep-link username is taken from `getMe` rather than configuration so
/// links always point at the bot actually running.
pub async fn build_gateway(
    config: &JoingateConfig,
    platform: Arc<dyn DynPlatform>,
    store: Arc<dyn RecordStore>,
) -> Result<Gateway, ServerError> {
    let secret = config
        .gate
        .secret_key
        .as_ref()
        .ok_or(ConfigError::Missing("gate.secret_key"))?;
    let archive_chat = config
        .gate
        .archive_chat
        .clone()
        .ok_or(ConfigError::Missing("gate.archive_chat"))?;
    let codec = TokenCodec::from_secret(secret)?;

    let me = platform.get_me().await?;
    info!(bot = %me.username, bot_id = me.id, platform = platform.name(), "connected");

    let gateway = GatewayBuilder::new()
        .platform(platform)
        .store(store)
        .codec(codec)
        .targets(config.gate.targets.clone())
        .admins(config.gate.admins.iter().copied())
        .archive_chat(archive_chat)
        .buttons_per_row(config.gate.buttons_per_row)
        .callback_deadline(config.gate.callback_deadline())
        .bot_username(me.username)
        .texts(config.texts.clone())
        .build()?;
    Ok(gateway)
}
