//! The `joingate` bot: configuration, logging, storage wiring and the
//! Telegram update loop around [`joingate_gateway::Gateway`].

pub mod bootstrap;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod state_factory;
pub mod telemetry;

pub use bootstrap::build_gateway;
