use thiserror::Error;

/// Errors that abort a unit of work.
///
/// Platform failures never show up here: each one is handled where it
/// happens and turned into a reply or a [`GateOutcome`](crate::GateOutcome).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The record store failed.
    #[error("state error: {0}")]
    State(#[from] joingate_state::StateError),

    /// The gateway was misconfigured (e.g. missing required components).
    #[error("configuration error: {0}")]
    Configuration(String),
}
