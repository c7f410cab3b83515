//! Migration error types.

use thiserror::Error;

/// Errors that abort a migration operation.
///
/// Row-level failures and the insert abort snapshot are returned as data,
/// not raised; only request-level API failures, store integrity
/// violations, and staging I/O surface here.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The remote API call failed at the request level.
    #[error("api error: {0}")]
    Api(#[from] ferry_api::ApiError),

    /// The mapping store rejected a read or write.
    #[error("mapping store error: {0}")]
    Store(#[from] ferry_core::Error),

    /// A staging artifact could not be read or written.
    #[error("staging error: {0}")]
    Staging(#[from] ferry_core::StagingError),
}
