use thiserror::Error;

/// Errors raised while building core domain values from raw input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid join target: {0}")]
    InvalidTarget(String),

    #[error("invalid file id: {0}")]
    InvalidFileId(String),
}
