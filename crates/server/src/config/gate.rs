use joingate_core::{ChatRef, JoinTarget, UserId};
use std::time::Duration;

use joingate_gateway::builder::{DEFAULT_BUTTONS_PER_ROW, DEFAULT_CALLBACK_DEADLINE};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

/// Membership gate settings.
#[derive(Debug, Deserialize)]
pub struct GateConfig {
    /// Private chat where ingested files are stored. Accepts a numeric id or
    /// an `@username`.
    #[serde(default, deserialize_with = "deserialize_chat")]
    pub archive_chat: Option<ChatRef>,

    /// Users allowed to ingest files.
    #[serde(default)]
    pub admins: Vec<UserId>,

    /// Channels a user must have joined, in check order.
    #[serde(default)]
    pub targets: Vec<JoinTarget>,

    /// Token signing key. Overridden by `JOINGATE_SECRET_KEY`.
    pub secret_key: Option<SecretString>,

    /// Join buttons per keyboard row.
    #[serde(default = "default_buttons_per_row")]
    pub buttons_per_row: usize,

    /// Seconds a retry button press may spend on membership checks.
    #[serde(default = "default_callback_deadline_seconds")]
    pub callback_deadline_seconds: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            archive_chat: None,
            admins: Vec::new(),
            targets: Vec::new(),
            secret_key: None,
            buttons_per_row: default_buttons_per_row(),
            callback_deadline_seconds: default_callback_deadline_seconds(),
        }
    }
}

impl GateConfig {
    pub fn callback_deadline(&self) -> Duration {
        Duration::from_secs(self.callback_deadline_seconds)
    }
}

fn default_buttons_per_row() -> usize {
    DEFAULT_BUTTONS_PER_ROW
}

fn default_callback_deadline_seconds() -> u64 {
    DEFAULT_CALLBACK_DEADLINE.as_secs()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawChat {
    Id(i64),
    Text(String),
}

fn deserialize_chat<'de, D>(deserializer: D) -> Result<Option<ChatRef>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<RawChat>::deserialize(deserializer)?.map(|raw| match raw {
            RawChat::Id(id) => ChatRef::Id(id),
            RawChat::Text(text) => ChatRef::parse(&text),
        }),
    )
}
