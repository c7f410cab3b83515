//! Field metadata descriptors returned by the describe call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type tag the remote system uses for relationship fields.
const REFERENCE_TYPE: &str = "reference";

/// Metadata for a single field on a remote object.
///
/// Unknown keys from the remote payload are preserved in `extra` so the
/// archived describe JSON stays faithful to what the wire returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescribe {
    /// Field name.
    pub name: String,
    /// Type tag (e.g. `string`, `reference`, `datetime`).
    #[serde(rename = "type")]
    pub field_type: String,
    /// Whether the field accepts null.
    pub nillable: bool,
    /// Whether the field may be set on create.
    #[serde(rename = "createable")]
    pub creatable: bool,
    /// Possible target object types for reference fields.
    #[serde(rename = "referenceTo", default, skip_serializing_if = "Vec::is_empty")]
    pub reference_to: Vec<String>,
    /// Remaining describe attributes, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldDescribe {
    /// Create a scalar field descriptor.
    pub fn scalar(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            nillable: true,
            creatable: true,
            reference_to: vec![],
            extra: Map::new(),
        }
    }

    /// Create a reference field descriptor.
    pub fn reference(name: impl Into<String>, targets: Vec<String>) -> Self {
        Self {
            name: name.into(),
            field_type: REFERENCE_TYPE.into(),
            nillable: true,
            creatable: true,
            reference_to: targets,
            extra: Map::new(),
        }
    }

    /// Mark the field as non-nillable.
    pub fn required(mut self) -> Self {
        self.nillable = false;
        self
    }

    /// Mark the field as not settable on create.
    pub fn read_only(mut self) -> Self {
        self.creatable = false;
        self
    }

    /// Check whether this field references another object.
    pub fn is_reference(&self) -> bool {
        self.field_type == REFERENCE_TYPE
    }
}

/// Full describe metadata for one remote object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescribe {
    /// Object type name.
    pub name: String,
    /// Field descriptors in the order the remote system lists them.
    pub fields: Vec<FieldDescribe>,
    /// Remaining describe attributes, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ObjectDescribe {
    /// Create a describe payload from a list of field descriptors.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescribe>) -> Self {
        Self {
            name: name.into(),
            fields,
            extra: Map::new(),
        }
    }
}
