use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ChatRef, FileId, MessageId, UserId};

/// Media category of an archived file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Document,
    Video,
    Photo,
    Audio,
    Voice,
}

impl MediaKind {
    /// Precedence used when a message carries more than one media field.
    pub const PRECEDENCE: [Self; 5] = [
        Self::Document,
        Self::Video,
        Self::Photo,
        Self::Audio,
        Self::Voice,
    ];

    /// Return a string representation of the media kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Video => "video",
            Self::Photo => "photo",
            Self::Audio => "audio",
            Self::Voice => "voice",
        }
    }

    /// Pick the first kind, in [`PRECEDENCE`](Self::PRECEDENCE) order, for
    /// which `present` returns `true`.
    pub fn detect(mut present: impl FnMut(Self) -> bool) -> Option<Self> {
        Self::PRECEDENCE.into_iter().find(|kind| present(*kind))
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of media stored in the archive channel.
///
/// Records are written once at ingestion and are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Internal identifier, carried inside tokens.
    pub file_id: FileId,

    /// Archive chat holding the copied message.
    pub archive_chat: ChatRef,

    /// Message id of the copy inside the archive chat.
    pub archive_message_id: MessageId,

    /// Media category.
    pub kind: MediaKind,

    /// HTML-formatted caption captured at ingestion, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    /// Operator who submitted the media.
    pub saved_by: UserId,

    /// When the record was created.
    pub saved_at: DateTime<Utc>,
}

impl FileRecord {
    /// Create a new record stamped with the current time.
    pub fn new(
        file_id: FileId,
        archive_chat: ChatRef,
        archive_message_id: MessageId,
        kind: MediaKind,
        saved_by: UserId,
    ) -> Self {
        Self {
            file_id,
            archive_chat,
            archive_message_id,
            kind,
            caption: None,
            saved_by,
            saved_at: Utc::now(),
        }
    }

    /// Attach a caption.
    #[must_use]
    pub fn with_caption(mut self, caption: Option<String>) -> Self {
        self.caption = caption;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_follows_precedence() {
        let kind = MediaKind::detect(|k| matches!(k, MediaKind::Photo | MediaKind::Document));
        assert_eq!(kind, Some(MediaKind::Document));

        let kind = MediaKind::detect(|k| k == MediaKind::Voice);
        assert_eq!(kind, Some(MediaKind::Voice));

        assert_eq!(MediaKind::detect(|_| false), None);
    }

    #[test]
    fn record_json_shape() {
        let record = FileRecord::new(
            FileId::parse("abc123").unwrap(),
            ChatRef::Id(-100_777),
            42,
            MediaKind::Video,
            7,
        )
        .with_caption(Some("<b>hi</b>".into()));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["file_id"], "abc123");
        assert_eq!(json["archive_chat"], -100_777);
        assert_eq!(json["archive_message_id"], 42);
        assert_eq!(json["kind"], "video");
        assert_eq!(json["caption"], "<b>hi</b>");

        let back: FileRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn caption_is_omitted_when_absent() {
        let record = FileRecord::new(
            FileId::parse("abc").unwrap(),
            ChatRef::Id(1),
            1,
            MediaKind::Photo,
            1,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("caption").is_none());
    }
}
