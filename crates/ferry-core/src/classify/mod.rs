//! Field and relationship classification from remote describe metadata.
//!
//! The classifier partitions an object's fields by how they migrate: plain
//! values are copied, reference fields are rewritten through the mapping
//! store, and non-creatable fields are excluded from outbound payloads. It
//! also produces the field-selection query used for export and re-query.

mod order;

pub use order::migration_order;

use std::collections::BTreeMap;

use ferry_api::{FieldDescribe, ObjectDescribe};

/// How a creatable field participates in migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain value field, copied as-is.
    Scalar,
    /// Nillable reference; an unresolved value may be dropped.
    Lookup(String),
    /// Non-nillable reference; the target must exist before insert.
    MasterDetail(String),
}

/// The migration-ready partition of one object's fields.
///
/// Recomputed per run from describe metadata, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectClassification {
    /// Object type name.
    pub object: String,
    /// Every field name, in describe order.
    pub fields: Vec<String>,
    /// Fields that may be set on create, in describe order.
    pub creatable_fields: Vec<String>,
    /// Master-detail fields and the object type each one references.
    pub master_detail: BTreeMap<String, String>,
    /// Lookup fields and the object type each one references.
    pub lookup: BTreeMap<String, String>,
    /// Field-selection query listing every field on the object.
    pub query: String,
}

impl ObjectClassification {
    /// How the given field participates in migration.
    ///
    /// Returns `None` for non-creatable fields; they never appear in an
    /// outbound payload.
    pub fn kind(&self, field: &str) -> Option<FieldKind> {
        if let Some(target) = self.master_detail.get(field) {
            return Some(FieldKind::MasterDetail(target.clone()));
        }
        if let Some(target) = self.lookup.get(field) {
            return Some(FieldKind::Lookup(target.clone()));
        }
        if self.creatable_fields.iter().any(|f| f == field) {
            return Some(FieldKind::Scalar);
        }
        None
    }
}

/// Partition an object's fields by how they migrate.
///
/// A creatable reference field is master-detail when non-nillable and a
/// lookup when nillable; any other creatable field is scalar. Non-creatable
/// fields are excluded from the partition and from insert/update payloads
/// but still appear in the field-selection query.
///
/// A reference field listing several possible targets resolves to the first
/// listed target only; polymorphic references are not modeled further.
pub fn classify(describe: &ObjectDescribe) -> ObjectClassification {
    let mut fields = Vec::with_capacity(describe.fields.len());
    let mut creatable_fields = Vec::new();
    let mut master_detail = BTreeMap::new();
    let mut lookup = BTreeMap::new();

    for field in &describe.fields {
        fields.push(field.name.clone());
        if !field.creatable {
            continue;
        }
        creatable_fields.push(field.name.clone());
        if let Some(target) = reference_target(field) {
            if field.nillable {
                lookup.insert(field.name.clone(), target.to_string());
            } else {
                master_detail.insert(field.name.clone(), target.to_string());
            }
        }
    }

    let query = format!("SELECT {} FROM {}", fields.join(","), describe.name);

    ObjectClassification {
        object: describe.name.clone(),
        fields,
        creatable_fields,
        master_detail,
        lookup,
        query,
    }
}

/// First listed reference target, if the field is a reference.
fn reference_target(field: &FieldDescribe) -> Option<&str> {
    if !field.is_reference() {
        return None;
    }
    field.reference_to.first().map(String::as_str)
}
