use std::collections::HashSet;
use std::time::Duration;

use joingate_core::{ChatRef, JoinTarget, UserId};
use serde::Deserialize;

/// User-facing texts.
///
/// `start_message` may contain `{mention}`; `saved` may contain `{link}`.
/// Both, together with `force_sub_message`, are sent as HTML. The remaining
/// replies are plain text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GateTexts {
    pub start_message: String,
    pub force_sub_message: String,
    pub join_label: String,
    pub done_label: String,
    pub not_joined_notice: String,
    pub invalid_link: String,
    pub file_not_found: String,
    pub delivery_failed: String,
    pub archive_failed: String,
    pub saved: String,
    /// Sent when the record store cannot be reached.
    pub temporary_failure: String,
}

impl Default for GateTexts {
    fn default() -> Self {
        Self {
            start_message: "Hi {mention}!\n\nOpen a file link to receive your file.".into(),
            force_sub_message: "<b>Join the channels below first</b>, then press the button to get your file.".into(),
            join_label: "Join channel".into(),
            done_label: "I've joined".into(),
            not_joined_notice: "You haven't joined all channels yet.".into(),
            invalid_link: "This link is invalid or corrupted.".into(),
            file_not_found: "File not found. It may have been removed from the archive.".into(),
            delivery_failed: "Could not fetch the file from the archive channel. Make sure the bot is an admin there with read and post rights.".into(),
            archive_failed: "Could not save to the archive channel. Make sure the bot is an admin there with post rights.".into(),
            saved: "<b>Saved.</b>\n\nLink:\n<code>{link}</code>".into(),
            temporary_failure: "Something went wrong on our side. Please try again in a moment.".into(),
        }
    }
}

/// Immutable gate configuration shared by every unit of work.
#[derive(Debug, Clone)]
pub struct GateSettings {
    /// Channels a user must have joined, checked in order.
    pub targets: Vec<JoinTarget>,
    /// Operators allowed to archive media.
    pub admins: HashSet<UserId>,
    /// Chat holding archived copies.
    pub archive_chat: ChatRef,
    /// Join buttons per keyboard row.
    pub buttons_per_row: usize,
    /// Bot username used in deep links, without `@`.
    pub bot_username: String,
    /// Longest a retry may spend checking membership before the callback
    /// is answered as "not joined".
    pub callback_deadline: Duration,
    pub texts: GateTexts,
}

impl GateSettings {
    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admins.contains(&user_id)
    }
}
