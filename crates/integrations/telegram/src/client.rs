use std::time::Duration;

use joingate_core::{ChatRef, MemberStatus, MessageId, UserId};
use joingate_platform::{BotIdentity, CallbackNotice, OutgoingMessage, Platform, PlatformError};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::TelegramConfig;
use crate::error::TelegramError;
use crate::types::{
    ALLOWED_UPDATES, AnswerCallbackQueryRequest, ApiResponse, ChatMember, CopyMessageRequest,
    DeleteMessageRequest, GetChatMemberRequest, GetUpdatesRequest, InlineKeyboardMarkup,
    LinkPreviewOptions, MessageIdResult, ReplyParameters, SendMessageRequest, Update, User,
};

/// Telegram Bot API client.
///
/// Implements [`Platform`] so the gateway can drive it, and adds
/// [`get_updates`](Self::get_updates) for the polling loop.
pub struct TelegramClient {
    config: TelegramConfig,
    client: Client,
}

impl TelegramClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TelegramError::Setup(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Create a new client with a custom HTTP client.
    pub fn with_client(config: TelegramConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// The client configuration.
    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// Call `method` with a JSON `body` and decode its `result`.
    ///
    /// `timeout` overrides the client-wide request timeout.
    async fn call<B, T>(
        &self,
        method: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let timeout = timeout.unwrap_or(self.config.request_timeout);
        let response = self
            .client
            .post(self.config.method_url(method))
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| TelegramError::transport(e, timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TelegramError::transport(e, timeout))?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if status == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                return Err(TelegramError::RateLimited { retry_after: None });
            }
            Err(_) if !status.is_success() => {
                return Err(TelegramError::Api {
                    code: i64::from(status.as_u16()),
                    description: text,
                });
            }
            Err(e) => return Err(TelegramError::Decode(format!("{method}: {e}"))),
        };

        if !envelope.ok {
            let code = envelope
                .error_code
                .unwrap_or_else(|| i64::from(status.as_u16()));
            let retry_after = envelope
                .parameters
                .and_then(|p| p.retry_after)
                .map(Duration::from_secs);
            if code == 429 || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                warn!(method, ?retry_after, "Telegram API rate limit hit");
                return Err(TelegramError::RateLimited { retry_after });
            }
            return Err(TelegramError::Api {
                code,
                description: envelope.description.unwrap_or_default(),
            });
        }

        envelope
            .result
            .ok_or_else(|| TelegramError::Decode(format!("{method}: missing result")))
    }

    /// Long-poll for updates after `offset`.
    ///
    /// Waits up to the configured poll timeout for something to arrive. The
    /// HTTP timeout for this call is the poll timeout plus the request
    /// timeout.
    #[instrument(skip(self), fields(platform = "telegram"))]
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, PlatformError> {
        let body = GetUpdatesRequest {
            offset,
            limit: None,
            timeout: self.config.poll_timeout.as_secs(),
            allowed_updates: ALLOWED_UPDATES,
        };
        let timeout = self.config.poll_timeout + self.config.request_timeout;
        let updates: Vec<Update> = self.call("getUpdates", &body, Some(timeout)).await?;
        if !updates.is_empty() {
            debug!(count = updates.len(), "received updates");
        }
        Ok(updates)
    }

    /// Confirm every update below `offset` without waiting for new ones.
    ///
    /// Telegram only forgets updates once a later `getUpdates` call passes a
    /// higher offset, so this is called once on shutdown.
    #[instrument(skip(self), fields(platform = "telegram"))]
    pub async fn acknowledge(&self, offset: i64) -> Result<(), PlatformError> {
        let body = GetUpdatesRequest {
            offset: Some(offset),
            limit: Some(1),
            timeout: 0,
            allowed_updates: ALLOWED_UPDATES,
        };
        let _: Vec<Update> = self.call("getUpdates", &body, None).await?;
        Ok(())
    }
}

impl Platform for TelegramClient {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "telegram"
    }

    #[instrument(skip(self), fields(platform = "telegram"))]
    async fn get_me(&self) -> Result<BotIdentity, PlatformError> {
        let me: User = self.call("getMe", &serde_json::json!({}), None).await?;
        let username = me.username.ok_or_else(|| {
            PlatformError::Serialization("getMe returned a bot without a username".into())
        })?;
        Ok(BotIdentity {
            id: me.id,
            username,
        })
    }

    #[instrument(skip(self), fields(platform = "telegram"))]
    async fn get_chat_member(
        &self,
        chat: &ChatRef,
        user_id: UserId,
    ) -> Result<MemberStatus, PlatformError> {
        let body = GetChatMemberRequest {
            chat_id: chat,
            user_id,
        };
        let member: ChatMember = self.call("getChatMember", &body, None).await?;
        Ok(member.status)
    }

    #[instrument(skip(self), fields(platform = "telegram"))]
    async fn copy_message(
        &self,
        to: &ChatRef,
        from: &ChatRef,
        message_id: MessageId,
    ) -> Result<MessageId, PlatformError> {
        let body = CopyMessageRequest {
            chat_id: to,
            from_chat_id: from,
            message_id,
        };
        let copied: MessageIdResult = self.call("copyMessage", &body, None).await?;
        debug!(new_message_id = copied.message_id, "message copied");
        Ok(copied.message_id)
    }

    #[instrument(skip(self, message), fields(platform = "telegram", chat = %message.chat))]
    async fn send_message(&self, message: &OutgoingMessage) -> Result<MessageId, PlatformError> {
        let body = SendMessageRequest {
            chat_id: &message.chat,
            text: &message.text,
            parse_mode: message.parse_mode,
            link_preview_options: message
                .disable_link_preview
                .then_some(LinkPreviewOptions { is_disabled: true }),
            reply_parameters: message.reply_to.map(|message_id| ReplyParameters {
                message_id,
                allow_sending_without_reply: true,
            }),
            reply_markup: message.keyboard.as_ref().map(InlineKeyboardMarkup::from),
        };
        // sendMessage returns a full Message; only its id matters here.
        let sent: MessageIdResult = self.call("sendMessage", &body, None).await?;
        Ok(sent.message_id)
    }

    #[instrument(skip(self, notice), fields(platform = "telegram"))]
    async fn answer_callback(
        &self,
        callback_id: &str,
        notice: Option<&CallbackNotice>,
    ) -> Result<(), PlatformError> {
        let body = AnswerCallbackQueryRequest {
            callback_query_id: callback_id,
            text: notice.map(|n| n.text.as_str()),
            show_alert: notice.map(|n| n.show_alert),
        };
        let _: bool = self.call("answerCallbackQuery", &body, None).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(platform = "telegram"))]
    async fn delete_message(
        &self,
        chat: &ChatRef,
        message_id: MessageId,
    ) -> Result<(), PlatformError> {
        let body = DeleteMessageRequest {
            chat_id: chat,
            message_id,
        };
        let _: bool = self.call("deleteMessage", &body, None).await?;
        Ok(())
    }
}
