//! Error types raised by narrative backends.

use thiserror::Error;

/// Errors surfaced while generating narrative text.
///
/// None of these reach the turn loop; callers fall back to the request's
/// built-in text and log the error.
#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to decode response: {0}")]
    Decode(#[from] std::io::Error),

    #[error("backend returned no usable text")]
    EmptyResponse,

    #[error("generation worker disconnected")]
    Disconnected,
}

impl From<ureq::Error> for NarrativeError {
    fn from(err: ureq::Error) -> Self {
        NarrativeError::Request(err.to_string())
    }
}
