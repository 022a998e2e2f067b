use joingate_core::{ChatRef, InlineKeyboard, MessageId, UserId};
use serde::{Deserialize, Serialize};

/// Text formatting mode for outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

/// A text message to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat: ChatRef,
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    /// Message to reply to. Sending still succeeds if it is gone.
    pub reply_to: Option<MessageId>,
    pub keyboard: Option<InlineKeyboard>,
    pub disable_link_preview: bool,
}

impl OutgoingMessage {
    /// A plain-text message with link previews disabled.
    pub fn text(chat: ChatRef, text: impl Into<String>) -> Self {
        Self {
            chat,
            text: text.into(),
            parse_mode: None,
            reply_to: None,
            keyboard: None,
            disable_link_preview: true,
        }
    }

    /// An HTML message with link previews disabled.
    pub fn html(chat: ChatRef, text: impl Into<String>) -> Self {
        Self {
            parse_mode: Some(ParseMode::Html),
            ..Self::text(chat, text)
        }
    }

    /// Send as a reply to `message_id`.
    #[must_use]
    pub fn reply_to(mut self, message_id: Option<MessageId>) -> Self {
        self.reply_to = message_id;
        self
    }

    /// Attach an inline keyboard.
    #[must_use]
    pub fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// A notice shown to the user when answering a callback query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackNotice {
    pub text: String,
    /// Show as a modal alert instead of a transient toast.
    pub show_alert: bool,
}

impl CallbackNotice {
    pub fn alert(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            show_alert: true,
        }
    }
}

/// The bot's own account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: UserId,
    pub username: String,
}
