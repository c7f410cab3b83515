//! The remote object API trait.

use crate::describe::ObjectDescribe;
use crate::error::ApiError;
use crate::record::FieldMap;
use crate::result::{QueryResult, SaveResult};
use async_trait::async_trait;

/// A bulk-capable CRUD API exposed by a remote object store.
///
/// Implementations own the session with the remote system; callers hold a
/// handle and issue one blocking round trip at a time. Bulk operations
/// return one [`SaveResult`] per submitted record, positionally aligned
/// with the input.
#[async_trait]
pub trait ObjectApi {
    /// Fetch field metadata for an object type.
    ///
    /// Returns `Ok(None)` when the remote system has no metadata for the
    /// object; callers treat that as a skippable condition, not a failure.
    async fn describe(&self, object: &str) -> Result<Option<ObjectDescribe>, ApiError>;

    /// Create a single record.
    async fn create(&self, object: &str, fields: &FieldMap) -> Result<SaveResult, ApiError>;

    /// Update a batch of records in one call.
    ///
    /// Each row must carry its identifier; the result list is aligned with
    /// the input order.
    async fn update_bulk(
        &self,
        object: &str,
        records: &[FieldMap],
    ) -> Result<Vec<SaveResult>, ApiError>;

    /// Delete a batch of records by identifier in one call.
    async fn delete_bulk(&self, object: &str, ids: &[String]) -> Result<Vec<SaveResult>, ApiError>;

    /// Run a query expected to return all matching rows.
    async fn query_all(&self, query: &str) -> Result<QueryResult, ApiError>;
}
