//! The membership gate and delivery orchestrator of joingate.
//!
//! A [`Gateway`] turns three kinds of inbound work into platform calls:
//!
//! - [`Gateway::handle_start`]: `/start <token>` checks membership of every
//!   join target, then resolves the token and copies the archived file to the
//!   user, or shows a join prompt.
//! - [`Gateway::handle_retry`]: the "I've joined" button re-runs the check and
//!   delivers once it passes.
//! - [`Gateway::handle_ingest`]: operators send media, which is copied to the
//!   archive chat and answered with a deep link.
//!
//! Membership checks fail closed: any error while querying a target counts as
//! "not joined".

pub mod builder;
pub mod callback;
pub mod error;
pub mod gateway;
pub mod membership;
pub mod metrics;
pub mod outcome;
pub mod settings;

pub use builder::{DEFAULT_CALLBACK_DEADLINE, GatewayBuilder};
pub use callback::{CALLBACK_PREFIX, callback_data, deep_link, parse_callback_data};
pub use error::GatewayError;
pub use gateway::Gateway;
pub use membership::{build_join_keyboard, is_joined_all};
pub use metrics::{GatewayMetrics, MetricsSnapshot};
pub use outcome::GateOutcome;
pub use settings::{GateSettings, GateTexts};
