//! Error types for the job runner client.

use concierge_core::TaskKind;
use thiserror::Error;

/// Errors that can occur when talking to the job runner.
#[derive(Debug, Error)]
pub enum JobClientError {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The runner answered with a non-success status.
    #[error("job runner returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// The configured base URL cannot carry a path.
    #[error("invalid job runner URL: {0}")]
    Url(String),

    /// No credential or job definition for this kind.
    #[error("job runner not configured for {0}")]
    NotConfigured(TaskKind),

    /// The execution is not (yet) visible on the runner.
    #[error("execution not found: {0}")]
    ExecutionNotFound(String),

    /// The response parsed as JSON but matched no known shape.
    #[error("unrecognized response: {0}")]
    UnrecognizedResponse(String),
}

impl From<url::ParseError> for JobClientError {
    fn from(e: url::ParseError) -> Self {
        Self::Url(e.to_string())
    }
}
