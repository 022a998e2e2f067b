use std::future::Future;

use async_trait::async_trait;
use joingate_core::{ChatRef, MemberStatus, MessageId, UserId};

use crate::error::PlatformError;
use crate::message::{BotIdentity, CallbackNotice, OutgoingMessage};

/// Strongly-typed platform client trait with native `async fn`.
///
/// This trait is **not** object-safe. For dynamic dispatch use
/// [`DynPlatform`]; every `Platform` implements it through a blanket impl.
pub trait Platform: Send + Sync {
    /// Returns the name of this platform client.
    fn name(&self) -> &str;

    /// The bot's own account.
    fn get_me(&self) -> impl Future<Output = Result<BotIdentity, PlatformError>> + Send;

    /// Membership status of `user_id` in `chat`.
    fn get_chat_member(
        &self,
        chat: &ChatRef,
        user_id: UserId,
    ) -> impl Future<Output = Result<MemberStatus, PlatformError>> + Send;

    /// Copy message `message_id` from `from` into `to`, returning the id of
    /// the new message.
    fn copy_message(
        &self,
        to: &ChatRef,
        from: &ChatRef,
        message_id: MessageId,
    ) -> impl Future<Output = Result<MessageId, PlatformError>> + Send;

    /// Send a text message, returning its id.
    fn send_message(
        &self,
        message: &OutgoingMessage,
    ) -> impl Future<Output = Result<MessageId, PlatformError>> + Send;

    /// Answer a callback query, optionally showing a notice.
    fn answer_callback(
        &self,
        callback_id: &str,
        notice: Option<&CallbackNotice>,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Delete a message.
    fn delete_message(
        &self,
        chat: &ChatRef,
        message_id: MessageId,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;
}

/// Object-safe platform trait for use behind `Arc<dyn DynPlatform>`.
///
/// Implement [`Platform`] instead and rely on the blanket implementation.
#[async_trait]
pub trait DynPlatform: Send + Sync {
    fn name(&self) -> &str;

    async fn get_me(&self) -> Result<BotIdentity, PlatformError>;

    async fn get_chat_member(
        &self,
        chat: &ChatRef,
        user_id: UserId,
    ) -> Result<MemberStatus, PlatformError>;

    async fn copy_message(
        &self,
        to: &ChatRef,
        from: &ChatRef,
        message_id: MessageId,
    ) -> Result<MessageId, PlatformError>;

    async fn send_message(&self, message: &OutgoingMessage) -> Result<MessageId, PlatformError>;

    async fn answer_callback(
        &self,
        callback_id: &str,
        notice: Option<&CallbackNotice>,
    ) -> Result<(), PlatformError>;

    async fn delete_message(&self, chat: &ChatRef, message_id: MessageId)
    -> Result<(), PlatformError>;
}

#[async_trait]
impl<T: Platform + Sync> DynPlatform for T {
    fn name(&self) -> &str {
        Platform::name(self)
    }

    async fn get_me(&self) -> Result<BotIdentity, PlatformError> {
        Platform::get_me(self).await
    }

    async fn get_chat_member(
        &self,
        chat: &ChatRef,
        user_id: UserId,
    ) -> Result<MemberStatus, PlatformError> {
        Platform::get_chat_member(self, chat, user_id).await
    }

    async fn copy_message(
        &self,
        to: &ChatRef,
        from: &ChatRef,
        message_id: MessageId,
    ) -> Result<MessageId, PlatformError> {
        Platform::copy_message(self, to, from, message_id).await
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<MessageId, PlatformError> {
        Platform::send_message(self, message).await
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        notice: Option<&CallbackNotice>,
    ) -> Result<(), PlatformError> {
        Platform::answer_callback(self, callback_id, notice).await
    }

    async fn delete_message(
        &self,
        chat: &ChatRef,
        message_id: MessageId,
    ) -> Result<(), PlatformError> {
        Platform::delete_message(self, chat, message_id).await
    }
}
