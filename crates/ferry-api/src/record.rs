//! Record field-map representation.

use serde_json::Value;

/// Field name of the system identifier on every object.
pub const ID_FIELD: &str = "Id";

/// A single record's field values, keyed by field name.
///
/// Values are JSON so the same shape serves CSV-sourced input (all strings),
/// outbound create/update payloads, and query rows returned by the remote
/// system (which may carry nested values such as the `attributes` envelope).
pub type FieldMap = serde_json::Map<String, Value>;

/// Check whether a field value counts as absent.
///
/// The remote API treats an explicitly empty value differently from an
/// absent one; blank fields must not be sent at all or they overwrite
/// remote defaults.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
