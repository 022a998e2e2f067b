//! Inbound units of work handed to the gateway by the update dispatcher.

use crate::record::MediaKind;
use crate::types::{ChatRef, MessageId, UserId};

/// The user behind an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: UserId,
    pub first_name: Option<String>,
}

impl UserRef {
    pub fn new(id: UserId, first_name: Option<String>) -> Self {
        Self { id, first_name }
    }
}

/// A `/start` command, with or without a deep-link payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub user: UserRef,
    pub chat: ChatRef,
    pub message_id: MessageId,
    /// The token carried by the deep link, if any.
    pub payload: Option<String>,
}

/// A press on the "I've joined" button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryRequest {
    pub callback_id: String,
    pub user: UserRef,
    /// Raw callback payload.
    pub data: String,
    /// Chat and id of the message holding the join prompt, when the platform
    /// still has it.
    pub prompt: Option<(ChatRef, MessageId)>,
}

/// A message that may carry media to archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    pub user: UserRef,
    pub chat: ChatRef,
    pub message_id: MessageId,
    pub kind: Option<MediaKind>,
    /// HTML-rendered caption.
    pub caption_html: Option<String>,
}
