use serde::{Deserialize, Serialize};

/// A user's membership status in a chat, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberStatus {
    /// Everything except `left` and `kicked` counts as joined.
    #[must_use]
    pub fn is_joined(self) -> bool {
        !matches!(self, Self::Left | Self::Kicked)
    }
}
