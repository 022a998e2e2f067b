use joingate_core::{
    ButtonAction, ChatRef, InlineKeyboard, MediaKind, MemberStatus, MessageId, UserId,
};
use joingate_platform::ParseMode;
use serde::{Deserialize, Serialize};

use crate::format::render_html;

/// Envelope of every Bot API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub error_code: Option<i64>,
    pub description: Option<String>,
    pub parameters: Option<ResponseParameters>,
}

/// Extra information attached to some failed responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseParameters {
    /// Seconds to wait before repeating a rate-limited request.
    pub retry_after: Option<u64>,
    pub migrate_to_chat_id: Option<i64>,
}

/// A Telegram user or bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

/// A chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
    pub username: Option<String>,
}

/// A formatting entity inside a text or caption.
///
/// `offset` and `length` count UTF-16 code units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: usize,
    pub length: usize,
    pub url: Option<String>,
    pub user: Option<User>,
    pub language: Option<String>,
    pub custom_emoji_id: Option<String>,
}

/// The identifying part of any file-bearing object (document, video, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHandle {
    pub file_id: String,
    pub file_unique_id: String,
}

/// A message. Only the fields joingate reads are modelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
    pub text: Option<String>,
    pub caption: Option<String>,
    #[serde(default)]
    pub caption_entities: Vec<MessageEntity>,
    pub document: Option<FileHandle>,
    pub video: Option<FileHandle>,
    pub photo: Option<Vec<FileHandle>>,
    pub audio: Option<FileHandle>,
    pub voice: Option<FileHandle>,
}

impl Message {
    /// The media category carried by this message, if any.
    pub fn media_kind(&self) -> Option<MediaKind> {
        MediaKind::detect(|kind| match kind {
            MediaKind::Document => self.document.is_some(),
            MediaKind::Video => self.video.is_some(),
            MediaKind::Photo => self.photo.as_ref().is_some_and(|p| !p.is_empty()),
            MediaKind::Audio => self.audio.is_some(),
            MediaKind::Voice => self.voice.is_some(),
        })
    }

    /// The caption rendered as HTML, if there is a caption.
    pub fn caption_html(&self) -> Option<String> {
        self.caption
            .as_deref()
            .map(|caption| render_html(caption, &self.caption_entities))
    }

    /// If this is a command addressed to us, returns `(command, argument)`.
    ///
    /// `/start@my_bot abc` yields `("start", Some("abc"))`. Only the first
    /// word after the command is the argument; anything after it is dropped.
    /// Commands aimed at another bot are ignored.
    pub fn command(&self, bot_username: &str) -> Option<(&str, Option<&str>)> {
        let text = self.text.as_deref()?.trim();
        let rest = text.strip_prefix('/')?;
        let (head, arg) = match rest.split_once(char::is_whitespace) {
            Some((head, arg)) => (head, arg.split_whitespace().next()),
            None => (rest, None),
        };
        let command = match head.split_once('@') {
            Some((command, target)) if target.eq_ignore_ascii_case(bot_username) => command,
            Some(_) => return None,
            None => head,
        };
        Some((command, arg))
    }
}

/// An incoming callback query from an inline keyboard button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

/// One incoming update from `getUpdates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

/// Result of `getChatMember`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMember {
    pub status: MemberStatus,
    pub user: User,
}

/// Result of `copyMessage`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageIdResult {
    pub message_id: MessageId,
}

/// `InlineKeyboardMarkup` as sent to the Bot API.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// A single button of an [`InlineKeyboardMarkup`].
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

impl From<&InlineKeyboard> for InlineKeyboardMarkup {
    fn from(keyboard: &InlineKeyboard) -> Self {
        let inline_keyboard = keyboard
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|button| {
                        let (url, callback_data) = match &button.action {
                            ButtonAction::Url(url) => (Some(url.clone()), None),
                            ButtonAction::Callback(data) => (None, Some(data.clone())),
                        };
                        InlineKeyboardButton {
                            text: button.text.clone(),
                            url,
                            callback_data,
                        }
                    })
                    .collect()
            })
            .collect();
        Self { inline_keyboard }
    }
}

/// `LinkPreviewOptions` (only the flag joingate uses).
#[derive(Debug, Clone, Serialize)]
pub struct LinkPreviewOptions {
    pub is_disabled: bool,
}

/// `ReplyParameters` (only the fields joingate uses).
#[derive(Debug, Clone, Serialize)]
pub struct ReplyParameters {
    pub message_id: MessageId,
    pub allow_sending_without_reply: bool,
}

/// Body of `sendMessage`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a ChatRef,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_preview_options: Option<LinkPreviewOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_parameters: Option<ReplyParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

/// Body of `copyMessage`.
#[derive(Debug, Clone, Serialize)]
pub struct CopyMessageRequest<'a> {
    pub chat_id: &'a ChatRef,
    pub from_chat_id: &'a ChatRef,
    pub message_id: MessageId,
}

/// Body of `getChatMember`.
#[derive(Debug, Clone, Serialize)]
pub struct GetChatMemberRequest<'a> {
    pub chat_id: &'a ChatRef,
    pub user_id: UserId,
}

/// Body of `answerCallbackQuery`.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerCallbackQueryRequest<'a> {
    pub callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_alert: Option<bool>,
}

/// Body of `deleteMessage`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteMessageRequest<'a> {
    pub chat_id: &'a ChatRef,
    pub message_id: MessageId,
}

/// Body of `getUpdates`.
#[derive(Debug, Clone, Serialize)]
pub struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}

/// Update kinds joingate subscribes to.
pub const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];
