//! Required/default handling shared by every validator.

use dschema_core::json::{present, stringify};
use dschema_core::{Diagnostic, Schema, ValidationResult};

/// Apply `default` and `required` to `data`.
///
/// Absent data (missing or JSON `null`) is replaced by the schema default.
/// If it is still absent and the schema is required, a `required` error is
/// recorded. Otherwise the (possibly defaulted) data is the value; absent,
/// optional data yields neither value nor error.
pub fn base_validate(schema: &Schema, data: Option<&serde_json::Value>) -> ValidationResult {
    let mut result = ValidationResult::new();
    match present(data).or_else(|| present(schema.default.as_ref())) {
        Some(value) => {
            result.set_value(value.clone());
        }
        None if schema.required => {
            result.add_error(Diagnostic::new(
                "required",
                format!("required, but got ({}).", stringify(data)),
            ));
        }
        None => {}
    }
    result
}

/// A `type` error for a schema whose kind does not match its validator.
pub(crate) fn kind_mismatch(expected: &str, schema: &Schema) -> ValidationResult {
    let mut result = ValidationResult::new();
    result.add_error(Diagnostic::new(
        "type",
        format!("schema of type ({}) given to the {expected} validator.", schema.type_name()),
    ));
    result
}

/// A `type` error for data of the wrong shape.
pub(crate) fn type_error(result: &mut ValidationResult, expected: &str, value: &serde_json::Value) {
    result.add_error(Diagnostic::new(
        "type",
        format!("expected {expected}, but got ({}).", stringify(Some(value))),
    ));
}
