//! The messaging-platform seam of joingate.
//!
//! [`Platform`] is implemented by concrete clients (see `joingate-telegram`);
//! the gateway only ever talks to [`DynPlatform`] so it can hold any client
//! behind an `Arc`.

pub mod error;
pub mod message;
pub mod platform;
pub mod testing;

pub use error::PlatformError;
pub use message::{BotIdentity, CallbackNotice, OutgoingMessage, ParseMode};
pub use platform::{DynPlatform, Platform};
