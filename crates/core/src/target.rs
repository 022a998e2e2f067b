use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::ChatRef;

const PUBLIC_LINK_BASE: &str = "https://t.me/";

/// A channel the user must have joined before a file is delivered.
///
/// Parsed once from its configuration string:
///
/// | raw value                          | checked against | join button  |
/// |------------------------------------|-----------------|--------------|
/// | `@channel`                         | `@channel`      | `https://t.me/channel` |
/// | `-100123\|https://t.me/+invite`    | `-100123`       | `https://t.me/+invite` |
/// | `https://t.me/+invite`             | the URL itself  | the URL      |
/// | anything else                      | the raw value   | `https://t.me/` |
///
/// A bare invite link cannot be used for membership queries, so a gate built
/// from one never opens. It is accepted to keep the join button usable while
/// an operator fixes the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum JoinTarget {
    /// A public channel addressed by its `@handle`.
    Handle { handle: String },
    /// A private channel: numeric id for checks, invite link for joining.
    IdWithInvite { chat: ChatRef, invite_url: String },
    /// A bare invite link.
    InviteLink { url: String },
    /// Anything else, passed through verbatim.
    Bare { raw: String },
}

impl JoinTarget {
    /// Parse a raw configuration value.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(CoreError::InvalidTarget("empty target".to_owned()));
        }

        if let Some((check, url)) = s.split_once('|') {
            let (check, url) = (check.trim(), url.trim());
            if check.is_empty() || url.is_empty() {
                return Err(CoreError::InvalidTarget(format!(
                    "expected '<chat>|<invite-url>', got '{s}'"
                )));
            }
            return Ok(Self::IdWithInvite {
                chat: ChatRef::parse(check),
                invite_url: url.to_owned(),
            });
        }

        if let Some(name) = s.strip_prefix('@') {
            if name.is_empty() {
                return Err(CoreError::InvalidTarget("handle must not be empty".to_owned()));
            }
            return Ok(Self::Handle {
                handle: s.to_owned(),
            });
        }

        if s.starts_with("https://t.me/") || s.starts_with("http://t.me/") {
            return Ok(Self::InviteLink { url: s.to_owned() });
        }

        Ok(Self::Bare { raw: s.to_owned() })
    }

    /// The reference used for membership queries.
    #[must_use]
    pub fn check_ref(&self) -> ChatRef {
        match self {
            Self::Handle { handle } => ChatRef::Handle(handle.clone()),
            Self::IdWithInvite { chat, .. } => chat.clone(),
            Self::InviteLink { url } => ChatRef::Handle(url.clone()),
            Self::Bare { raw } => ChatRef::parse(raw),
        }
    }

    /// The URL shown to the user on the join button.
    #[must_use]
    pub fn join_url(&self) -> String {
        match self {
            Self::Handle { handle } => {
                format!("{PUBLIC_LINK_BASE}{}", handle.trim_start_matches('@'))
            }
            Self::IdWithInvite { invite_url, .. } => invite_url.clone(),
            Self::InviteLink { url } => url.clone(),
            Self::Bare { .. } => PUBLIC_LINK_BASE.to_owned(),
        }
    }

    /// Whether membership can actually be verified for this target.
    ///
    /// `false` for bare invite links and for bare values without an invite
    /// link; callers log a warning at load time for those.
    #[must_use]
    pub fn is_checkable(&self) -> bool {
        match self {
            Self::Handle { .. } | Self::IdWithInvite { .. } => true,
            Self::InviteLink { .. } => false,
            Self::Bare { raw } => raw.parse::<i64>().is_ok(),
        }
    }
}

impl TryFrom<String> for JoinTarget {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<JoinTarget> for String {
    fn from(target: JoinTarget) -> Self {
        target.to_string()
    }
}

impl fmt::Display for JoinTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handle { handle } => f.write_str(handle),
            Self::IdWithInvite { chat, invite_url } => write!(f, "{chat}|{invite_url}"),
            Self::InviteLink { url } => f.write_str(url),
            Self::Bare { raw } => f.write_str(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_target() {
        let t = JoinTarget::parse(" @public ").unwrap();
        assert_eq!(t.check_ref(), ChatRef::Handle("@public".into()));
        assert_eq!(t.join_url(), "https://t.me/public");
        assert!(t.is_checkable());
    }

    #[test]
    fn id_with_invite_target() {
        let t = JoinTarget::parse("-100123 | https://t.me/+secret").unwrap();
        assert_eq!(t.check_ref(), ChatRef::Id(-100_123));
        assert_eq!(t.join_url(), "https://t.me/+secret");
        assert!(t.is_checkable());
    }

    #[test]
    fn split_happens_on_first_pipe() {
        let t = JoinTarget::parse("-1|https://t.me/+a|b").unwrap();
        assert_eq!(t.join_url(), "https://t.me/+a|b");
    }

    #[test]
    fn bare_invite_link_target() {
        let t = JoinTarget::parse("https://t.me/+invite").unwrap();
        assert_eq!(t.check_ref(), ChatRef::Handle("https://t.me/+invite".into()));
        assert_eq!(t.join_url(), "https://t.me/+invite");
        assert!(!t.is_checkable());

        let t = JoinTarget::parse("http://t.me/+invite").unwrap();
        assert!(matches!(t, JoinTarget::InviteLink { .. }));
    }

    #[test]
    fn bare_id_target() {
        let t = JoinTarget::parse("-100999").unwrap();
        assert_eq!(t.check_ref(), ChatRef::Id(-100_999));
        assert_eq!(t.join_url(), "https://t.me/");
        assert!(t.is_checkable());
    }

    #[test]
    fn rejects_malformed_targets() {
        assert!(JoinTarget::parse("").is_err());
        assert!(JoinTarget::parse("@").is_err());
        assert!(JoinTarget::parse("|https://t.me/+x").is_err());
        assert!(JoinTarget::parse("-100|").is_err());
    }

    #[test]
    fn deserializes_from_string_list() {
        let targets: Vec<JoinTarget> =
            serde_json::from_str(r#"["@a", "-1|https://t.me/+b"]"#).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].join_url(), "https://t.me/+b");
    }

    #[test]
    fn deserialize_rejects_invalid() {
        let result: Result<Vec<JoinTarget>, _> = serde_json::from_str(r#"["@"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for raw in ["@a", "-1|https://t.me/+b", "https://t.me/+c", "-100"] {
            let t = JoinTarget::parse(raw).unwrap();
            assert_eq!(JoinTarget::parse(&t.to_string()).unwrap(), t);
        }
    }
}
