//! API error types.

use thiserror::Error;

/// Errors reported by a remote object API implementation.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The remote system rejected the request as malformed.
    ///
    /// For a per-record create this invalidates the rest of the batch: the
    /// remaining records were never attempted and their outcome is unknown.
    #[error("malformed request for {object}: {message}")]
    MalformedRequest {
        /// Object type the request targeted.
        object: String,
        /// Remote error message.
        message: String,
    },

    /// The request never completed (connection, timeout, I/O).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Create a malformed-request error.
    pub fn malformed(object: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::MalformedRequest {
            object: object.into(),
            message: message.into(),
        }
    }
}
