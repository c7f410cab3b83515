//! Integration tests for the migrator against a scripted in-memory API.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use ferry_api::{
    ApiError, FieldDescribe, FieldMap, ObjectApi, ObjectDescribe, QueryResult, SaveResult,
    ID_FIELD,
};
use ferry_core::{classify, DataLayout, MappingStore, ObjectClassification};
use ferry_migrate::{InsertOutcome, Migrator};

const JOB: &str = "job-1";

/// An object API double that replays scripted responses.
#[derive(Default)]
struct ScriptedApi {
    describes: HashMap<String, ObjectDescribe>,
    create_results: Mutex<Vec<Result<SaveResult, ApiError>>>,
    created: Mutex<Vec<FieldMap>>,
    update_results: Vec<SaveResult>,
    delete_results: Vec<SaveResult>,
    query_results: HashMap<String, QueryResult>,
}

impl ScriptedApi {
    fn with_creates(results: Vec<Result<SaveResult, ApiError>>) -> Self {
        Self {
            create_results: Mutex::new(results),
            ..Self::default()
        }
    }

    fn created_payloads(&self) -> Vec<FieldMap> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectApi for ScriptedApi {
    async fn describe(&self, object: &str) -> Result<Option<ObjectDescribe>, ApiError> {
        Ok(self.describes.get(object).cloned())
    }

    async fn create(&self, _object: &str, fields: &FieldMap) -> Result<SaveResult, ApiError> {
        self.created.lock().unwrap().push(fields.clone());
        let mut results = self.create_results.lock().unwrap();
        if results.is_empty() {
            return Err(ApiError::Transport("unscripted create".into()));
        }
        results.remove(0)
    }

    async fn update_bulk(
        &self,
        _object: &str,
        records: &[FieldMap],
    ) -> Result<Vec<SaveResult>, ApiError> {
        assert_eq!(records.len(), self.update_results.len());
        Ok(self.update_results.clone())
    }

    async fn delete_bulk(&self, _object: &str, ids: &[String]) -> Result<Vec<SaveResult>, ApiError> {
        assert_eq!(ids.len(), self.delete_results.len());
        Ok(self.delete_results.clone())
    }

    async fn query_all(&self, query: &str) -> Result<QueryResult, ApiError> {
        Ok(self
            .query_results
            .get(query)
            .cloned()
            .unwrap_or_else(QueryResult::empty))
    }
}

struct TestContext {
    store: MappingStore,
    layout: DataLayout,
    _dir: tempfile::TempDir,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = MappingStore::open(dir.path().join("db")).unwrap();
        store.record_job(JOB, "source-org", "dest-org").unwrap();
        let layout = DataLayout::new(dir.path().join("data"));
        layout.ensure().unwrap();

        Self {
            store,
            layout,
            _dir: dir,
        }
    }

    fn migrator<'a, A: ObjectApi>(&'a self, api: &'a A) -> Migrator<'a, A> {
        Migrator::new(api, &self.store, &self.layout, JOB)
    }
}

fn contact_classification() -> ObjectClassification {
    classify(&ObjectDescribe::new(
        "Contact",
        vec![
            FieldDescribe::scalar("Id", "id").read_only(),
            FieldDescribe::scalar("Name", "string").required(),
            FieldDescribe::scalar("Phone", "string"),
            FieldDescribe::reference("AccountId", vec!["Account".into()]).required(),
            FieldDescribe::reference("ReportsToId", vec!["Contact".into()]),
        ],
    ))
}

fn account_classification() -> ObjectClassification {
    classify(&ObjectDescribe::new(
        "Account",
        vec![
            FieldDescribe::scalar("Id", "id").read_only(),
            FieldDescribe::scalar("Name", "string").required(),
        ],
    ))
}

fn row(pairs: &[(&str, &str)]) -> FieldMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

#[tokio::test]
async fn test_insert_produces_one_outcome_per_record() {
    let ctx = TestContext::new();
    let api = ScriptedApi::with_creates(vec![
        Ok(SaveResult::created("B1")),
        Ok(SaveResult::created("B2")),
    ]);
    let migrator = ctx.migrator(&api);

    let rows = vec![
        row(&[("Id", "A1"), ("Name", "Acme")]),
        row(&[("Id", "A2"), ("Name", "Globex")]),
    ];
    let outcome = migrator
        .insert(&account_classification(), &rows)
        .await
        .unwrap();

    let InsertOutcome::Completed(report) = outcome else {
        panic!("expected completed insert");
    };
    assert_eq!(report.attempted, 2);
    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes.iter().all(|o| o.success));
    assert_eq!(report.id_map.get("A1").unwrap(), "B1");
    assert_eq!(report.id_map.get("A2").unwrap(), "B2");
    assert!(report.path.is_file());

    // Mappings are persisted, not just returned.
    assert_eq!(
        ctx.store.resolve(JOB, "Account", "A1").unwrap().as_deref(),
        Some("B1")
    );
    assert_eq!(
        ctx.store.resolve(JOB, "Account", "A2").unwrap().as_deref(),
        Some("B2")
    );

    // The source identifier is stripped from outbound payloads.
    for payload in api.created_payloads() {
        assert!(!payload.contains_key(ID_FIELD));
    }
}

#[tokio::test]
async fn test_insert_abort_boundary() {
    let ctx = TestContext::new();
    let api = ScriptedApi::with_creates(vec![
        Ok(SaveResult::created("B1")),
        Err(ApiError::malformed("Account", "bad payload")),
    ]);
    let migrator = ctx.migrator(&api);

    let rows = vec![
        row(&[("Id", "A1"), ("Name", "Acme")]),
        row(&[("Id", "A2"), ("Name", "Globex")]),
        row(&[("Id", "A3"), ("Name", "Initech")]),
    ];
    let outcome = migrator
        .insert(&account_classification(), &rows)
        .await
        .unwrap();

    let InsertOutcome::Aborted(aborted) = outcome else {
        panic!("expected aborted insert");
    };
    // Only the record before the trigger has an outcome; the trigger and
    // everything after it were never completed.
    assert_eq!(aborted.outcomes.len(), 1);
    assert_eq!(aborted.failed_index, 1);
    assert_eq!(aborted.failed_record.get("Id"), Some(&json!("A2")));
    assert_eq!(aborted.message, "bad payload");
    assert_eq!(aborted.id_map.len(), 1);
    assert_eq!(aborted.id_map.get("A1").unwrap(), "B1");
    assert!(aborted.path.is_file());

    // The third record was never submitted.
    assert_eq!(api.created_payloads().len(), 2);
}

#[tokio::test]
async fn test_insert_transport_error_propagates() {
    let ctx = TestContext::new();
    let api = ScriptedApi::with_creates(vec![Err(ApiError::Transport("connection reset".into()))]);
    let migrator = ctx.migrator(&api);

    let rows = vec![row(&[("Id", "A1"), ("Name", "Acme")])];
    let result = migrator.insert(&account_classification(), &rows).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_insert_remaps_master_detail_reference() {
    let ctx = TestContext::new();
    ctx.store
        .record_mapping(JOB, "Account", "ACC1", "NEW1")
        .unwrap();
    let api = ScriptedApi::with_creates(vec![Ok(SaveResult::created("B1"))]);
    let migrator = ctx.migrator(&api);

    let rows = vec![row(&[
        ("Id", "C1"),
        ("Name", "Ada"),
        ("AccountId", "ACC1"),
    ])];
    let outcome = migrator
        .insert(&contact_classification(), &rows)
        .await
        .unwrap();

    assert!(matches!(outcome, InsertOutcome::Completed(_)));
    let payloads = api.created_payloads();
    assert_eq!(payloads[0].get("AccountId"), Some(&json!("NEW1")));
}

#[tokio::test]
async fn test_insert_rejects_unresolved_master_detail_without_submitting() {
    let ctx = TestContext::new();
    let api = ScriptedApi::default();
    let migrator = ctx.migrator(&api);

    let rows = vec![row(&[
        ("Id", "C1"),
        ("Name", "Ada"),
        ("AccountId", "ACC1"),
    ])];
    let outcome = migrator
        .insert(&contact_classification(), &rows)
        .await
        .unwrap();

    let InsertOutcome::Completed(report) = outcome else {
        panic!("expected completed insert");
    };
    assert_eq!(report.outcomes.len(), 1);
    assert!(!report.outcomes[0].success);
    assert_eq!(report.outcomes[0].errors[0].status_code, "UNRESOLVED_REFERENCE");
    assert!(report.id_map.is_empty());

    // No create call was issued for the unresolvable record.
    assert!(api.created_payloads().is_empty());
}

#[tokio::test]
async fn test_insert_drops_unresolved_lookup_and_blank_fields() {
    let ctx = TestContext::new();
    ctx.store
        .record_mapping(JOB, "Account", "ACC1", "NEW1")
        .unwrap();
    let api = ScriptedApi::with_creates(vec![Ok(SaveResult::created("B1"))]);
    let migrator = ctx.migrator(&api);

    let rows = vec![row(&[
        ("Id", "C1"),
        ("Name", "Ada"),
        ("Phone", ""),
        ("AccountId", "ACC1"),
        ("ReportsToId", "C9"),
    ])];
    let outcome = migrator
        .insert(&contact_classification(), &rows)
        .await
        .unwrap();

    assert!(matches!(outcome, InsertOutcome::Completed(_)));
    let payload = &api.created_payloads()[0];
    assert_eq!(payload.get("Name"), Some(&json!("Ada")));
    // Blank cells and unresolved lookups are absent, not empty.
    assert!(!payload.contains_key("Phone"));
    assert!(!payload.contains_key("ReportsToId"));
}

#[tokio::test]
async fn test_insert_skips_mapping_for_empty_source_id() {
    let ctx = TestContext::new();
    let api = ScriptedApi::with_creates(vec![Ok(SaveResult::created("B1"))]);
    let migrator = ctx.migrator(&api);

    let rows = vec![row(&[("Name", "Acme")])];
    let outcome = migrator
        .insert(&account_classification(), &rows)
        .await
        .unwrap();

    let InsertOutcome::Completed(report) = outcome else {
        panic!("expected completed insert");
    };
    assert_eq!(report.outcomes.len(), 1);
    assert!(report.outcomes[0].success);
    assert!(report.id_map.is_empty());
    assert_eq!(ctx.store.mapping_count(JOB).unwrap(), 0);
}

#[tokio::test]
async fn test_update_reports_row_level_failures_without_aborting() {
    let ctx = TestContext::new();
    let api = ScriptedApi {
        update_results: vec![
            SaveResult::created("B1"),
            SaveResult::failed("FIELD_INTEGRITY_EXCEPTION", "bad picklist value"),
        ],
        ..ScriptedApi::default()
    };
    let migrator = ctx.migrator(&api);

    let rows = vec![
        row(&[("Id", "B1"), ("Name", "Acme")]),
        row(&[("Id", "B2"), ("Name", "Globex")]),
    ];
    let report = migrator.update("Account", &rows).await.unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert!(report.path.is_file());

    let annotated = std::fs::read_to_string(&report.path).unwrap();
    assert!(annotated.contains("status"));
    assert!(annotated.contains("FIELD_INTEGRITY_EXCEPTION"));
}

#[tokio::test]
async fn test_export_empty_result_creates_no_file() {
    let ctx = TestContext::new();
    let api = ScriptedApi::default();
    let migrator = ctx.migrator(&api);

    let exported = migrator
        .export("Account", "SELECT Id,Name FROM Account")
        .await
        .unwrap();

    assert!(exported.is_none());
    assert!(!ctx.layout.export_path("Account").exists());
}

#[tokio::test]
async fn test_export_writes_rows() {
    let ctx = TestContext::new();
    let api = ScriptedApi {
        query_results: HashMap::from([(
            "SELECT Id,Name FROM Account".to_string(),
            QueryResult::with_records(vec![
                row(&[("Id", "B1"), ("Name", "Acme")]),
                row(&[("Id", "B2"), ("Name", "Globex")]),
            ]),
        )]),
        ..ScriptedApi::default()
    };
    let migrator = ctx.migrator(&api);

    let exported = migrator
        .export("Account", "SELECT Id,Name FROM Account")
        .await
        .unwrap()
        .expect("export path");

    assert_eq!(exported, ctx.layout.export_path("Account"));
    let table = std::fs::read_to_string(&exported).unwrap();
    assert!(table.contains("Acme"));
    assert!(table.contains("Globex"));
}

#[tokio::test]
async fn test_ids_for_deletion_strips_envelope() {
    let ctx = TestContext::new();
    let mut with_envelope = row(&[("Id", "B1")]);
    with_envelope.insert(
        "attributes".into(),
        json!({"type": "Account", "url": "/services/data/Account/B1"}),
    );
    let api = ScriptedApi {
        query_results: HashMap::from([(
            "SELECT Id FROM Account".to_string(),
            QueryResult::with_records(vec![with_envelope, row(&[("Id", "B2")])]),
        )]),
        ..ScriptedApi::default()
    };
    let migrator = ctx.migrator(&api);

    let ids = migrator.ids_for_deletion("Account").await.unwrap();
    assert_eq!(ids, Some(vec!["B1".to_string(), "B2".to_string()]));
}

#[tokio::test]
async fn test_ids_for_deletion_distinguishes_no_records() {
    let ctx = TestContext::new();
    let api = ScriptedApi::default();
    let migrator = ctx.migrator(&api);

    assert_eq!(migrator.ids_for_deletion("Account").await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_aggregates_row_statuses() {
    let ctx = TestContext::new();
    let api = ScriptedApi {
        delete_results: vec![
            SaveResult::created("B1"),
            SaveResult::failed("ENTITY_IS_DELETED", "already deleted"),
        ],
        ..ScriptedApi::default()
    };
    let migrator = ctx.migrator(&api);

    let report = migrator
        .delete("Account", &["B1".to_string(), "B2".to_string()])
        .await
        .unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_classify_object_archives_describe_payload() {
    let ctx = TestContext::new();
    let describe = ObjectDescribe::new(
        "Contact",
        vec![
            FieldDescribe::scalar("Name", "string").required(),
            FieldDescribe::reference("AccountId", vec!["Account".into()]).required(),
        ],
    );
    let api = ScriptedApi {
        describes: HashMap::from([("Contact".to_string(), describe.clone())]),
        ..ScriptedApi::default()
    };
    let migrator = ctx.migrator(&api);

    let classification = migrator
        .classify_object("Contact")
        .await
        .unwrap()
        .expect("classification");

    assert_eq!(classification.query, "SELECT Name,AccountId FROM Contact");
    assert_eq!(
        classification.master_detail.get("AccountId").unwrap(),
        "Account"
    );

    let archive = ctx.layout.describe_path("Contact");
    let archived: ObjectDescribe =
        serde_json::from_str(&std::fs::read_to_string(&archive).unwrap()).unwrap();
    assert_eq!(archived, describe);
}

#[tokio::test]
async fn test_classify_object_without_metadata_is_skipped() {
    let ctx = TestContext::new();
    let api = ScriptedApi::default();
    let migrator = ctx.migrator(&api);

    assert!(migrator.classify_object("Unknown").await.unwrap().is_none());
    assert!(!ctx.layout.describe_path("Unknown").exists());
}
