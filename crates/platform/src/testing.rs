//! An in-process [`Platform`] for tests.
//!
//! [`MockPlatform`] records every call in order and answers membership
//! queries from a scripted table. Unscripted memberships fail with
//! [`PlatformError::Rejected`], mirroring a chat the bot cannot see.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use joingate_core::{ChatRef, MemberStatus, MessageId, UserId};
use parking_lot::Mutex;

use crate::error::PlatformError;
use crate::message::{BotIdentity, CallbackNotice, OutgoingMessage};
use crate::platform::Platform;

/// A call received by [`MockPlatform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    GetMe,
    GetChatMember {
        chat: ChatRef,
        user_id: UserId,
    },
    CopyMessage {
        to: ChatRef,
        from: ChatRef,
        message_id: MessageId,
    },
    SendMessage(OutgoingMessage),
    AnswerCallback {
        callback_id: String,
        notice: Option<CallbackNotice>,
    },
    DeleteMessage {
        chat: ChatRef,
        message_id: MessageId,
    },
}

#[derive(Debug)]
struct Inner {
    calls: Vec<PlatformCall>,
    members: HashMap<(ChatRef, UserId), MemberStatus>,
    broken_chats: HashSet<ChatRef>,
    fail_copies: bool,
    fail_deletes: bool,
    membership_delay: Option<Duration>,
    next_message_id: MessageId,
}

/// Scriptable, recording platform double.
#[derive(Debug)]
pub struct MockPlatform {
    username: String,
    inner: Mutex<Inner>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatform {
    /// A platform whose bot is called `joingate_test_bot`.
    pub fn new() -> Self {
        Self {
            username: "joingate_test_bot".to_owned(),
            inner: Mutex::new(Inner {
                calls: Vec::new(),
                members: HashMap::new(),
                broken_chats: HashSet::new(),
                fail_copies: false,
                fail_deletes: false,
                membership_delay: None,
                next_message_id: 1000,
            }),
        }
    }

    /// Override the bot username returned by `get_me`.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Script the membership status of `user_id` in `chat`.
    pub fn set_member(&self, chat: &ChatRef, user_id: UserId, status: MemberStatus) {
        self.inner
            .lock()
            .members
            .insert((chat.clone(), user_id), status);
    }

    /// Make every membership query against `chat` fail with a connection error.
    pub fn break_chat(&self, chat: &ChatRef) {
        self.inner.lock().broken_chats.insert(chat.clone());
    }

    /// Make every membership query take `delay` before answering.
    pub fn delay_memberships(&self, delay: Duration) {
        self.inner.lock().membership_delay = Some(delay);
    }

    /// Make `copy_message` fail.
    pub fn fail_copies(&self, fail: bool) {
        self.inner.lock().fail_copies = fail;
    }

    /// Make `delete_message` fail.
    pub fn fail_deletes(&self, fail: bool) {
        self.inner.lock().fail_deletes = fail;
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.inner.lock().calls.clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Messages sent so far.
    pub fn sent_messages(&self) -> Vec<OutgoingMessage> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::SendMessage(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    /// `(to, from, message_id)` for every copy attempted so far.
    pub fn copies(&self) -> Vec<(ChatRef, ChatRef, MessageId)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::CopyMessage {
                    to,
                    from,
                    message_id,
                } => Some((to, from, message_id)),
                _ => None,
            })
            .collect()
    }

    /// Chats queried for membership so far, in order.
    pub fn membership_queries(&self) -> Vec<ChatRef> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::GetChatMember { chat, .. } => Some(chat),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: PlatformCall) {
        self.inner.lock().calls.push(call);
    }

    fn next_id(&self) -> MessageId {
        let mut inner = self.inner.lock();
        inner.next_message_id += 1;
        inner.next_message_id
    }
}

impl Platform for MockPlatform {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_me(&self) -> Result<BotIdentity, PlatformError> {
        self.record(PlatformCall::GetMe);
        Ok(BotIdentity {
            id: 1,
            username: self.username.clone(),
        })
    }

    async fn get_chat_member(
        &self,
        chat: &ChatRef,
        user_id: UserId,
    ) -> Result<MemberStatus, PlatformError> {
        self.record(PlatformCall::GetChatMember {
            chat: chat.clone(),
            user_id,
        });
        let delay = self.inner.lock().membership_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let inner = self.inner.lock();
        if inner.broken_chats.contains(chat) {
            return Err(PlatformError::Connection(format!("{chat} unreachable")));
        }
        inner
            .members
            .get(&(chat.clone(), user_id))
            .copied()
            .ok_or_else(|| PlatformError::Rejected(format!("Bad Request: chat {chat} not found")))
    }

    async fn copy_message(
        &self,
        to: &ChatRef,
        from: &ChatRef,
        message_id: MessageId,
    ) -> Result<MessageId, PlatformError> {
        self.record(PlatformCall::CopyMessage {
            to: to.clone(),
            from: from.clone(),
            message_id,
        });
        if self.inner.lock().fail_copies {
            return Err(PlatformError::Rejected(
                "Forbidden: bot is not a member of the channel chat".into(),
            ));
        }
        Ok(self.next_id())
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<MessageId, PlatformError> {
        self.record(PlatformCall::SendMessage(message.clone()));
        Ok(self.next_id())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        notice: Option<&CallbackNotice>,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::AnswerCallback {
            callback_id: callback_id.to_owned(),
            notice: notice.cloned(),
        });
        Ok(())
    }

    async fn delete_message(
        &self,
        chat: &ChatRef,
        message_id: MessageId,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::DeleteMessage {
            chat: chat.clone(),
            message_id,
        });
        if self.inner.lock().fail_deletes {
            return Err(PlatformError::Rejected(
                "Bad Request: message can't be deleted".into(),
            ));
        }
        Ok(())
    }
}
