//! LLM error types.

use thiserror::Error;

/// Errors that can occur when talking to a completion endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or JSON decode failure
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// API returned a well-formed response with no choices
    #[error("api response contained no choices")]
    EmptyResponse,
}
