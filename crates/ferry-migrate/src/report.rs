//! Operation reports and the partial-failure snapshot.

use std::collections::BTreeMap;
use std::path::PathBuf;

use ferry_api::{FieldMap, SaveResult};

/// Source-to-destination identifier translations accumulated by one run,
/// keyed by source identifier.
pub type IdMap = BTreeMap<String, String>;

/// A completed insert run.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertReport {
    /// Identifiers remapped by this run.
    pub id_map: IdMap,
    /// Per-record outcomes in input order, one per input record.
    pub outcomes: Vec<SaveResult>,
    /// Number of input records.
    pub attempted: usize,
    /// The persisted status table.
    pub path: PathBuf,
}

/// Snapshot of an insert run stopped by a malformed-request rejection.
///
/// Records before `failed_index` were processed and have outcomes; records
/// from `failed_index` onward were never attempted, so a caller can retry
/// exactly the unsent remainder.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertAborted {
    /// Identifiers remapped before the abort.
    pub id_map: IdMap,
    /// Outcomes of the records processed before the abort, in input order.
    pub outcomes: Vec<SaveResult>,
    /// Zero-based input position of the record that triggered the abort.
    pub failed_index: usize,
    /// The triggering record as read from the input.
    pub failed_record: FieldMap,
    /// Remote error message for the rejection.
    pub message: String,
    /// The persisted status table covering the processed records.
    pub path: PathBuf,
}

/// Result of an insert run.
///
/// The aborted arm is a value, not an error, so callers are forced to
/// handle the partial case explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// Every input record was processed.
    Completed(InsertReport),
    /// The run stopped mid-batch; the snapshot holds the partial state.
    Aborted(InsertAborted),
}

impl InsertOutcome {
    /// Outcomes collected so far, regardless of how the run ended.
    pub fn outcomes(&self) -> &[SaveResult] {
        match self {
            InsertOutcome::Completed(report) => &report.outcomes,
            InsertOutcome::Aborted(aborted) => &aborted.outcomes,
        }
    }

    /// Identifier map accumulated so far.
    pub fn id_map(&self) -> &IdMap {
        match self {
            InsertOutcome::Completed(report) => &report.id_map,
            InsertOutcome::Aborted(aborted) => &aborted.id_map,
        }
    }
}

/// A completed bulk update run.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    /// The persisted status table.
    pub path: PathBuf,
    /// Number of submitted records.
    pub total: usize,
    /// Rows the remote system accepted.
    pub succeeded: usize,
    /// Rows the remote system rejected.
    pub failed: usize,
}

/// A completed bulk delete run.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteReport {
    /// Number of submitted identifiers.
    pub total: usize,
    /// Rows the remote system accepted.
    pub succeeded: usize,
    /// Rows the remote system rejected.
    pub failed: usize,
}
