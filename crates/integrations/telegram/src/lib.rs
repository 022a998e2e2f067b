//! Telegram Bot API client for joingate.
//!
//! [`TelegramClient`] implements [`Platform`](joingate_platform::Platform)
//! over the JSON flavour of the
//! [Bot API](https://core.telegram.org/bots/api) and additionally exposes
//! [`get_updates`](TelegramClient::get_updates) for long polling.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use joingate_telegram::{TelegramClient, TelegramConfig};
//!
//! let config = TelegramConfig::new("123456:ABC-DEF");
//! let client = TelegramClient::new(config).unwrap();
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod types;

pub use client::TelegramClient;
pub use config::TelegramConfig;
pub use error::TelegramError;
pub use format::render_html;
pub use types::{CallbackQuery, Chat, Message, MessageEntity, Update, User};
