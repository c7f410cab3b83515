//! Result types for create, bulk, and query operations.

use crate::record::FieldMap;
use serde::{Deserialize, Serialize};

/// Key under which query rows carry the system envelope metadata.
pub const ATTRIBUTES_FIELD: &str = "attributes";

/// One error attached to a failed save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveError {
    /// Machine-readable error code.
    #[serde(rename = "statusCode")]
    pub status_code: String,
    /// Human-readable message.
    pub message: String,
    /// Fields the error applies to, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// Outcome of one record inside a create or bulk call.
///
/// Bulk responses are positionally aligned with the submitted records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResult {
    /// Identifier assigned by the remote system, present on success.
    #[serde(default)]
    pub id: Option<String>,
    /// Whether the record was accepted.
    pub success: bool,
    /// Row-level errors, empty on success.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<SaveError>,
}

impl SaveResult {
    /// A successful save with the assigned identifier.
    pub fn created(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            success: true,
            errors: vec![],
        }
    }

    /// A failed save with a single error.
    pub fn failed(status_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: None,
            success: false,
            errors: vec![SaveError {
                status_code: status_code.into(),
                message: message.into(),
                fields: vec![],
            }],
        }
    }
}

/// Result of a query expected to return all matching rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Total number of matching records.
    #[serde(rename = "totalSize")]
    pub total_size: u64,
    /// The matching rows.
    pub records: Vec<FieldMap>,
}

impl QueryResult {
    /// An empty result.
    pub fn empty() -> Self {
        Self {
            total_size: 0,
            records: vec![],
        }
    }

    /// A result holding the given rows.
    pub fn with_records(records: Vec<FieldMap>) -> Self {
        Self {
            total_size: records.len() as u64,
            records,
        }
    }
}
