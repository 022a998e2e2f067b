use std::fmt;

use joingate_core::FileId;

/// What a handler did with a unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// `/start` without a payload answered with the welcome text.
    Welcomed,
    /// The user is missing at least one channel and got the join prompt.
    PromptShown,
    /// The token did not verify.
    InvalidToken,
    /// The token verified but no record exists for it.
    FileNotFound,
    /// The archived message could not be copied to the user.
    DeliveryFailed,
    /// The file was copied to the user.
    Delivered { file_id: FileId },
    /// The unit of work was not for us (foreign callback, non-admin sender,
    /// message without media).
    Ignored,
    /// The retry button was pressed but a channel is still missing.
    StillNotJoined,
    /// The operator's media could not be copied to the archive.
    ArchiveFailed,
    /// Media archived and a deep link issued.
    Saved { file_id: FileId, link: String },
}

impl GateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcomed => "welcomed",
            Self::PromptShown => "prompt_shown",
            Self::InvalidToken => "invalid_token",
            Self::FileNotFound => "file_not_found",
            Self::DeliveryFailed => "delivery_failed",
            Self::Delivered { .. } => "delivered",
            Self::Ignored => "ignored",
            Self::StillNotJoined => "still_not_joined",
            Self::ArchiveFailed => "archive_failed",
            Self::Saved { .. } => "saved",
        }
    }
}

impl fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
