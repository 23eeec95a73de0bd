//! LLM call errors.

use thiserror::Error;

/// Errors from a model call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    /// The service answered with an error status or an error body.
    #[error("api error: {0}")]
    ApiError(String),

    /// The request was rejected as invalid (4xx other than 404/408/429).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested model is not available on the server.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The call did not finish within the configured timeout.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be parsed.
    #[error("parsing failed: {0}")]
    Parsing(String),
}
