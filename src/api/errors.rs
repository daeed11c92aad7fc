//! Error types for the dashboard API boundary
//!
//! Every HTTP interaction with the backend surfaces as an ApiError.
//! Callers that need the fail-closed distinction only care about one
//! thing: did the request succeed or not. The variants exist so logs
//! and tests can tell a rejected credential from a dead network.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Credential rejected by the backend (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any non-success status other than 401
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport-level failure (DNS, connect, timeout, TLS)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("Response parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// True when the error means the presented token is not valid,
    /// as opposed to the backend being unreachable or broken.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}
