use std::sync::Arc;

use joingate_core::html::mention;
use joingate_core::{
    ChatRef, FileId, FileRecord, IngestRequest, MessageId, RetryRequest, StartRequest, UserRef,
};
use joingate_crypto::TokenCodec;
use joingate_platform::{CallbackNotice, DynPlatform, OutgoingMessage};
use joingate_state::{RecordStore, StateError};
use tracing::{debug, error, info, instrument, warn};

use crate::callback::{callback_data, deep_link, parse_callback_data};
use crate::error::GatewayError;
use crate::membership::{build_join_keyboard, is_joined_all};
use crate::metrics::GatewayMetrics;
use crate::outcome::GateOutcome;
use crate::settings::GateSettings;

/// Name used in the welcome mention when the user has no first name.
const FALLBACK_NAME: &str = "there";

/// The membership gate and delivery orchestrator.
///
/// Holds only immutable configuration and shared handles, so one instance
/// serves every concurrent unit of work.
pub struct Gateway {
    pub(crate) platform: Arc<dyn DynPlatform>,
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) codec: TokenCodec,
    pub(crate) settings: GateSettings,
    pub(crate) metrics: Arc<GatewayMetrics>,
}

impl Gateway {
    /// `/start`, with or without a deep-link token.
    #[instrument(
        name = "gateway.start",
        skip(self, request),
        fields(user_id = request.user.id, chat = %request.chat)
    )]
    pub async fn handle_start(&self, request: StartRequest) -> Result<GateOutcome, GatewayError> {
        let result = match request.payload.as_deref() {
            None => Ok(self.welcome(&request).await),
            Some(token) => {
                self.gate_or_deliver(
                    &request.user,
                    &request.chat,
                    Some(request.message_id),
                    token,
                )
                .await
            }
        };
        self.observe(result)
    }

    /// A press on the retry button under a join prompt.
    #[instrument(
        name = "gateway.retry",
        skip(self, request),
        fields(user_id = request.user.id, callback_id = %request.callback_id)
    )]
    pub async fn handle_retry(&self, request: RetryRequest) -> Result<GateOutcome, GatewayError> {
        let result = self.retry(request).await;
        self.observe(result)
    }

    /// Media sent to the bot by an operator.
    #[instrument(
        name = "gateway.ingest",
        skip(self, request),
        fields(user_id = request.user.id, kind = ?request.kind)
    )]
    pub async fn handle_ingest(&self, request: IngestRequest) -> Result<GateOutcome, GatewayError> {
        let result = self.ingest(request).await;
        self.observe(result)
    }

    /// The deep link for `token` under this bot.
    pub fn deep_link(&self, token: &str) -> String {
        deep_link(&self.settings.bot_username, token)
    }

    /// Issue a token for an existing record id.
    pub fn issue_token(&self, file_id: &FileId) -> String {
        self.codec.issue(file_id.as_str())
    }

    /// Return the gate configuration.
    pub fn settings(&self) -> &GateSettings {
        &self.settings
    }

    /// Return a reference to the gateway metrics.
    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    fn observe(
        &self,
        result: Result<GateOutcome, GatewayError>,
    ) -> Result<GateOutcome, GatewayError> {
        match &result {
            Ok(outcome) => {
                self.metrics.record(outcome);
                debug!(%outcome, "unit of work complete");
            }
            Err(_) => self.metrics.increment_store_errors(),
        }
        result
    }

    async fn welcome(&self, request: &StartRequest) -> GateOutcome {
        let name = request.user.first_name.as_deref().unwrap_or(FALLBACK_NAME);
        let text = self
            .settings
            .texts
            .start_message
            .replace("{mention}", &mention(request.user.id, name));
        self.send(
            OutgoingMessage::html(request.chat.clone(), text).reply_to(Some(request.message_id)),
        )
        .await;
        GateOutcome::Welcomed
    }

    async fn gate_or_deliver(
        &self,
        user: &UserRef,
        chat: &ChatRef,
        reply_to: Option<MessageId>,
        token: &str,
    ) -> Result<GateOutcome, GatewayError> {
        if !is_joined_all(self.platform.as_ref(), user.id, &self.settings.targets).await {
            let texts = &self.settings.texts;
            let keyboard = build_join_keyboard(
                &self.settings.targets,
                self.settings.buttons_per_row,
                &texts.join_label,
                &texts.done_label,
                &callback_data(token),
            );
            self.send(
                OutgoingMessage::html(chat.clone(), texts.force_sub_message.clone())
                    .reply_to(reply_to)
                    .with_keyboard(keyboard),
            )
            .await;
            return Ok(GateOutcome::PromptShown);
        }

        self.deliver(chat, reply_to, token).await
    }

    /// Resolve, look up and copy. Assumes the gate is already open.
    async fn deliver(
        &self,
        chat: &ChatRef,
        reply_to: Option<MessageId>,
        token: &str,
    ) -> Result<GateOutcome, GatewayError> {
        let texts = &self.settings.texts;

        let file_id = match self
            .codec
            .resolve_detailed(token)
            .map_err(|e| e.to_string())
            .and_then(|raw| FileId::parse(&raw).map_err(|e| e.to_string()))
        {
            Ok(file_id) => file_id,
            Err(reason) => {
                debug!(%reason, "rejected token");
                self.reply(chat, reply_to, &texts.invalid_link).await;
                return Ok(GateOutcome::InvalidToken);
            }
        };

        let lookup = self.store.get(&file_id).await;
        let Some(record) = self.or_apologize(chat, reply_to, lookup).await? else {
            debug!(%file_id, "no record for token");
            self.reply(chat, reply_to, &texts.file_not_found).await;
            return Ok(GateOutcome::FileNotFound);
        };

        match self
            .platform
            .copy_message(chat, &record.archive_chat, record.archive_message_id)
            .await
        {
            Ok(_) => {
                info!(%file_id, "file delivered");
                Ok(GateOutcome::Delivered { file_id })
            }
            Err(e) => {
                error!(
                    %file_id,
                    archive_chat = %record.archive_chat,
                    archive_message_id = record.archive_message_id,
                    error = %e,
                    "copying from the archive failed"
                );
                self.reply(chat, reply_to, &texts.delivery_failed).await;
                Ok(GateOutcome::DeliveryFailed)
            }
        }
    }

    async fn retry(&self, request: RetryRequest) -> Result<GateOutcome, GatewayError> {
        let Some(token) = parse_callback_data(&request.data) else {
            self.answer(&request.callback_id, None).await;
            return Ok(GateOutcome::Ignored);
        };

        let check = is_joined_all(self.platform.as_ref(), request.user.id, &self.settings.targets);
        let joined = match tokio::time::timeout(self.settings.callback_deadline, check).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(
                    deadline = ?self.settings.callback_deadline,
                    "membership check overran the callback deadline"
                );
                false
            }
        };
        if !joined {
            let notice = CallbackNotice::alert(self.settings.texts.not_joined_notice.clone());
            self.answer(&request.callback_id, Some(&notice)).await;
            return Ok(GateOutcome::StillNotJoined);
        }
        self.answer(&request.callback_id, None).await;

        // Without the prompt message the private chat with the user is the
        // only place left to deliver to.
        let chat = match &request.prompt {
            Some((chat, message_id)) => {
                if let Err(e) = self.platform.delete_message(chat, *message_id).await {
                    debug!(error = %e, "could not delete join prompt");
                }
                chat.clone()
            }
            None => ChatRef::Id(request.user.id),
        };

        self.deliver(&chat, None, token).await
    }

    async fn ingest(&self, request: IngestRequest) -> Result<GateOutcome, GatewayError> {
        if !self.settings.is_admin(request.user.id) {
            return Ok(GateOutcome::Ignored);
        }
        let Some(kind) = request.kind else {
            return Ok(GateOutcome::Ignored);
        };

        let archive = &self.settings.archive_chat;
        let archive_message_id = match self
            .platform
            .copy_message(archive, &request.chat, request.message_id)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                error!(%archive, error = %e, "copying to the archive failed");
                self.reply(
                    &request.chat,
                    Some(request.message_id),
                    &self.settings.texts.archive_failed,
                )
                .await;
                return Ok(GateOutcome::ArchiveFailed);
            }
        };

        let file_id = FileId::generate();
        let record = FileRecord::new(
            file_id.clone(),
            archive.clone(),
            archive_message_id,
            kind,
            request.user.id,
        )
        .with_caption(request.caption_html);
        let stored = self.store.upsert(&record).await;
        self.or_apologize(&request.chat, Some(request.message_id), stored)
            .await?;

        let link = self.deep_link(&self.issue_token(&file_id));
        info!(%file_id, %kind, archive_message_id, "file archived");

        let text = self.settings.texts.saved.replace("{link}", &link);
        self.send(
            OutgoingMessage::html(request.chat.clone(), text).reply_to(Some(request.message_id)),
        )
        .await;

        Ok(GateOutcome::Saved { file_id, link })
    }

    /// Pass `result` through, telling the user to try again when it failed.
    async fn or_apologize<T>(
        &self,
        chat: &ChatRef,
        reply_to: Option<MessageId>,
        result: Result<T, StateError>,
    ) -> Result<T, GatewayError> {
        if result.is_err() {
            self.reply(chat, reply_to, &self.settings.texts.temporary_failure)
                .await;
        }
        result.map_err(GatewayError::from)
    }

    async fn reply(&self, chat: &ChatRef, reply_to: Option<MessageId>, text: &str) {
        self.send(OutgoingMessage::text(chat.clone(), text).reply_to(reply_to))
            .await;
    }

    async fn send(&self, message: OutgoingMessage) {
        if let Err(e) = self.platform.send_message(&message).await {
            warn!(chat = %message.chat, error = %e, "sending reply failed");
        }
    }

    async fn answer(&self, callback_id: &str, notice: Option<&CallbackNotice>) {
        if let Err(e) = self.platform.answer_callback(callback_id, notice).await {
            warn!(error = %e, "answering callback query failed");
        }
    }
}
