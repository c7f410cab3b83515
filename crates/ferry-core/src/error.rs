//! Core error types.

use thiserror::Error;

/// Errors raised by the mapping store and key codec.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Key encoding or decoding error.
    #[error("invalid key format")]
    InvalidKey,

    /// A job row with this identifier already exists.
    #[error("job already recorded: {0}")]
    DuplicateJob(String),

    /// A mapping was written for a job that was never recorded.
    #[error("no job recorded with id {0}")]
    UnknownJob(String),

    /// A mapping already exists for this composite key.
    #[error("mapping already recorded for {object} {source_id} in job {job_id}")]
    DuplicateMapping {
        /// Job the write targeted.
        job_id: String,
        /// Object type name.
        object: String,
        /// Source-system identifier.
        source_id: String,
    },
}
