//! Core domain errors.

use thiserror::Error;

/// Core domain errors for Concierge.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Unrecognized task kind literal.
    #[error("Unknown task kind: {0}")]
    UnknownKind(String),

    /// Unrecognized task provider literal.
    #[error("Unknown task provider: {0}")]
    UnknownProvider(String),

    /// Unrecognized task status literal.
    #[error("Unknown task status: {0}")]
    UnknownStatus(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
