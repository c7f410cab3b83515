//! The record migrator: bulk operations against a remote object API.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info, warn};

use ferry_api::{is_blank, ApiError, FieldMap, ObjectApi, SaveResult, ATTRIBUTES_FIELD, ID_FIELD};
use ferry_core::staging::{self, DataLayout};
use ferry_core::{classify, FieldKind, MappingStore, ObjectClassification};

use crate::error::MigrateError;
use crate::report::{
    DeleteReport, IdMap, InsertAborted, InsertOutcome, InsertReport, UpdateReport,
};

/// Status code attached to records rejected before submission.
const UNRESOLVED_REFERENCE: &str = "UNRESOLVED_REFERENCE";

/// Executes the bulk operations of one migration job.
///
/// The API handle, mapping store, and staging layout are passed in
/// explicitly; nothing is process-global, so several jobs can run in one
/// process, each with its own migrator. Within one operation, remote calls
/// are issued one at a time so bulk responses stay positionally aligned
/// with their inputs.
pub struct Migrator<'a, A: ObjectApi> {
    api: &'a A,
    store: &'a MappingStore,
    layout: &'a DataLayout,
    job_id: String,
}

/// Outcome of preparing one input row for submission.
enum Prepared {
    /// Outbound payload, reference fields remapped.
    Ready(FieldMap),
    /// A master-detail target had no mapping; the record cannot exist on
    /// the destination and is never submitted.
    Unresolved(SaveResult),
}

impl<'a, A: ObjectApi> Migrator<'a, A> {
    /// Create a migrator for one job.
    pub fn new(
        api: &'a A,
        store: &'a MappingStore,
        layout: &'a DataLayout,
        job_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            store,
            layout,
            job_id: job_id.into(),
        }
    }

    /// The job this migrator serves.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Fetch, archive, and classify an object's metadata.
    ///
    /// Returns `Ok(None)` when the remote system has no metadata for the
    /// object; the object is skipped and the run continues. The raw payload
    /// is archived under `describe/` before classification.
    pub async fn classify_object(
        &self,
        object: &str,
    ) -> Result<Option<ObjectClassification>, MigrateError> {
        let Some(describe) = self.api.describe(object).await? else {
            warn!(object, "no describe metadata, skipping object");
            return Ok(None);
        };

        self.layout.ensure()?;
        staging::write_describe(&self.layout.describe_path(object), &describe)?;
        Ok(Some(classify(&describe)))
    }

    /// Insert records one at a time, remapping reference fields.
    ///
    /// For each input row, in order: the `Id` column is stripped, blank
    /// fields are dropped, reference fields are rewritten through the
    /// mapping store, and one create call is submitted. Successful creates
    /// with a non-empty source identifier are recorded in both the returned
    /// identifier map and the persistent store.
    ///
    /// A malformed-request rejection stops the run: the remaining records
    /// were never attempted, so the accumulated state is returned as
    /// [`InsertOutcome::Aborted`]. Transport and store failures propagate
    /// as errors. Either way one outcome exists per processed record and
    /// the annotated status table is persisted.
    pub async fn insert(
        &self,
        classification: &ObjectClassification,
        rows: &[FieldMap],
    ) -> Result<InsertOutcome, MigrateError> {
        let object = classification.object.as_str();
        let mut id_map = IdMap::new();
        let mut outcomes: Vec<SaveResult> = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let source_id = row
                .get(ID_FIELD)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            let payload = match self.prepare(classification, row)? {
                Prepared::Ready(payload) => payload,
                Prepared::Unresolved(result) => {
                    outcomes.push(result);
                    continue;
                }
            };

            match self.api.create(object, &payload).await {
                Ok(result) => {
                    if result.success && !source_id.is_empty() {
                        if let Some(new_id) = result.id.as_deref() {
                            id_map.insert(source_id.clone(), new_id.to_string());
                            self.store
                                .record_mapping(&self.job_id, object, &source_id, new_id)?;
                        }
                    }
                    outcomes.push(result);
                    debug!(object, record = index + 1, total = rows.len(), "record processed");
                }
                Err(ApiError::MalformedRequest { message, .. }) => {
                    let path =
                        self.write_status(object, "insert", &rows[..outcomes.len()], &outcomes)?;
                    let succeeded = count_succeeded(&outcomes);
                    info!(
                        object,
                        processed = outcomes.len(),
                        succeeded,
                        failed = outcomes.len() - succeeded,
                        failed_index = index,
                        "insert aborted by malformed request"
                    );
                    return Ok(InsertOutcome::Aborted(InsertAborted {
                        id_map,
                        outcomes,
                        failed_index: index,
                        failed_record: row.clone(),
                        message,
                        path,
                    }));
                }
                Err(e) => return Err(e.into()),
            }
        }

        let path = self.write_status(object, "insert", rows, &outcomes)?;
        let succeeded = count_succeeded(&outcomes);
        info!(
            object,
            attempted = rows.len(),
            succeeded,
            failed = outcomes.len() - succeeded,
            "insert complete"
        );
        Ok(InsertOutcome::Completed(InsertReport {
            id_map,
            outcomes,
            attempted: rows.len(),
            path,
        }))
    }

    /// Update records in one bulk call.
    ///
    /// Row failures never abort the batch: every row's status is attached
    /// to the persisted table and the aggregate counts are logged.
    pub async fn update(
        &self,
        object: &str,
        rows: &[FieldMap],
    ) -> Result<UpdateReport, MigrateError> {
        let results = self.api.update_bulk(object, rows).await?;
        let succeeded = count_succeeded(&results);
        let failed = results.len() - succeeded;

        let path = self.write_status(object, "update", rows, &results)?;
        info!(object, attempted = rows.len(), succeeded, failed, "update complete");

        Ok(UpdateReport {
            path,
            total: rows.len(),
            succeeded,
            failed,
        })
    }

    /// Query all records and write them to the export table.
    ///
    /// An empty result is notable but not fatal: it logs a warning and
    /// returns `Ok(None)` without creating a file.
    pub async fn export(
        &self,
        object: &str,
        query: &str,
    ) -> Result<Option<PathBuf>, MigrateError> {
        let result = self.api.query_all(query).await?;
        if result.total_size == 0 {
            warn!(object, "export query returned no records");
            return Ok(None);
        }

        self.layout.ensure()?;
        let path = self.layout.export_path(object);
        staging::write_rows(&path, &result.records)?;
        info!(
            object,
            records = result.records.len(),
            path = %path.display(),
            "export complete"
        );
        Ok(Some(path))
    }

    /// List every identifier of an object type.
    ///
    /// Returns `Ok(None)` when the object has no records, so "nothing to
    /// delete" stays distinguishable from an empty list. The system
    /// envelope carried on query rows is discarded.
    pub async fn ids_for_deletion(
        &self,
        object: &str,
    ) -> Result<Option<Vec<String>>, MigrateError> {
        let query = format!("SELECT {ID_FIELD} FROM {object}");
        let mut result = self.api.query_all(&query).await?;
        if result.total_size == 0 {
            warn!(object, "no records to delete");
            return Ok(None);
        }

        let ids = result
            .records
            .iter_mut()
            .filter_map(|row| {
                row.remove(ATTRIBUTES_FIELD);
                row.get(ID_FIELD).and_then(Value::as_str).map(str::to_string)
            })
            .collect();
        Ok(Some(ids))
    }

    /// Delete records by identifier in one bulk call.
    ///
    /// Per-row statuses are aggregated into the report the same way update
    /// failures are; a row failure never aborts the batch.
    pub async fn delete(&self, object: &str, ids: &[String]) -> Result<DeleteReport, MigrateError> {
        let results = self.api.delete_bulk(object, ids).await?;
        let succeeded = count_succeeded(&results);
        let failed = results.len() - succeeded;

        info!(object, attempted = ids.len(), succeeded, failed, "delete complete");

        Ok(DeleteReport {
            total: ids.len(),
            succeeded,
            failed,
        })
    }

    /// Build the outbound payload for one row.
    ///
    /// Only creatable fields are sent; the `Id` column and blank values are
    /// dropped so remote defaults are not overwritten. Master-detail
    /// references must resolve or the record is rejected before
    /// submission; unresolved lookups are dropped from the payload.
    fn prepare(
        &self,
        classification: &ObjectClassification,
        row: &FieldMap,
    ) -> Result<Prepared, MigrateError> {
        let mut payload = FieldMap::new();

        for field in &classification.creatable_fields {
            if field == ID_FIELD {
                continue;
            }
            let Some(value) = row.get(field) else {
                continue;
            };
            if is_blank(value) {
                continue;
            }

            match classification.kind(field) {
                Some(FieldKind::MasterDetail(target)) => {
                    let source_ref = value.as_str().unwrap_or_default();
                    match self.store.resolve(&self.job_id, &target, source_ref)? {
                        Some(dest) => {
                            payload.insert(field.clone(), Value::String(dest));
                        }
                        None => {
                            let message = format!(
                                "no mapping for {target} {source_ref} in job {}",
                                self.job_id
                            );
                            return Ok(Prepared::Unresolved(SaveResult::failed(
                                UNRESOLVED_REFERENCE,
                                message,
                            )));
                        }
                    }
                }
                Some(FieldKind::Lookup(target)) => {
                    let source_ref = value.as_str().unwrap_or_default();
                    match self.store.resolve(&self.job_id, &target, source_ref)? {
                        Some(dest) => {
                            payload.insert(field.clone(), Value::String(dest));
                        }
                        None => {
                            debug!(
                                field = field.as_str(),
                                target = target.as_str(),
                                source_ref,
                                "unresolved lookup dropped from payload"
                            );
                        }
                    }
                }
                _ => {
                    payload.insert(field.clone(), value.clone());
                }
            }
        }

        Ok(Prepared::Ready(payload))
    }

    fn write_status(
        &self,
        object: &str,
        operation: &str,
        rows: &[FieldMap],
        statuses: &[SaveResult],
    ) -> Result<PathBuf, MigrateError> {
        self.layout.ensure()?;
        let path = self.layout.success_path(object, operation);
        staging::write_status_rows(&path, rows, statuses)?;
        Ok(path)
    }
}

fn count_succeeded(results: &[SaveResult]) -> usize {
    results.iter().filter(|r| r.success).count()
}
