pub mod error;
pub mod html;
pub mod keyboard;
pub mod member;
pub mod record;
pub mod request;
pub mod target;
pub mod types;

pub use error::CoreError;
pub use keyboard::{ButtonAction, InlineButton, InlineKeyboard};
pub use member::MemberStatus;
pub use record::{FileRecord, MediaKind};
pub use request::{IngestRequest, RetryRequest, StartRequest, UserRef};
pub use target::JoinTarget;
pub use types::{ChatRef, FileId, MessageId, UserId};
