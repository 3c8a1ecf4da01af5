//! Steps shared by every per-type compiler: `required`, cover-error
//! reporting, and the common part of the JSON form.

use dschema_core::cover::{cover_boolean, CoverResult};
use dschema_core::json::stringify;
use dschema_core::{Diagnostic, HandleResult, Schema, SchemaJsonError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Record a cover failure under `constraint` and return the covered value.
pub(crate) fn cover_field<T, U>(
    result: &mut HandleResult<U>,
    constraint: &str,
    cover: CoverResult<T>,
) -> Option<T> {
    if cover.has_error() {
        result.add_error(Diagnostic::new(constraint, cover.error_summary()));
    }
    cover.value
}

/// `required`, defaulting to `false`.
pub(crate) fn compile_required<U>(raw: &Map<String, Value>, result: &mut HandleResult<U>) -> bool {
    cover_field(result, "required", cover_boolean(Some(false), raw.get("required"))).unwrap_or(false)
}

/// The raw `default`, unless absent or `null`.
pub(crate) fn raw_default(raw: &Map<String, Value>) -> Option<&Value> {
    raw.get("default").filter(|v| !v.is_null())
}

/// Require the raw `default` (if set) to satisfy `check`, else record a
/// `default` error naming `expected`.
pub(crate) fn checked_default<U>(
    raw: &Map<String, Value>,
    result: &mut HandleResult<U>,
    expected: &str,
    check: fn(&Value) -> bool,
) -> Option<Value> {
    let value = raw_default(raw)?;
    if check(value) {
        Some(value.clone())
    } else {
        result.add_error(Diagnostic::new(
            "default",
            format!("default must be {expected}, but got ({}).", stringify(Some(value))),
        ));
        None
    }
}

/// `type`, `required`, and `default` of a compiled schema.
pub(crate) fn base_json(schema: &Schema) -> Map<String, Value> {
    let mut json = Map::new();
    json.insert("type".to_string(), Value::String(schema.type_name().to_string()));
    json.insert("required".to_string(), Value::Bool(schema.required));
    if let Some(default) = &schema.default {
        json.insert("default".to_string(), default.clone());
    }
    json
}

/// Append the serialized fields of a constraint struct to `json`.
pub(crate) fn extend_json<T: Serialize>(
    type_name: &str,
    json: &mut Map<String, Value>,
    constraints: &T,
) -> Result<(), SchemaJsonError> {
    match serde_json::to_value(constraints) {
        Ok(Value::Object(fields)) => {
            json.extend(fields);
            Ok(())
        }
        Ok(other) => Err(invalid(type_name, "constraints", format!("expected an object, got {other}"))),
        Err(e) => Err(invalid(type_name, "constraints", e.to_string())),
    }
}

/// Read `required` and `default` back from a serialized schema.
pub(crate) fn parse_base(
    type_name: &str,
    json: &Map<String, Value>,
) -> Result<(bool, Option<Value>), SchemaJsonError> {
    let required = match json.get("required") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(invalid(type_name, "required", format!("expected a boolean, got {other}")))
        }
    };
    Ok((required, raw_default(json).cloned()))
}

/// Deserialize a constraint struct from a serialized schema.
pub(crate) fn parse_constraints<T: DeserializeOwned>(
    type_name: &str,
    json: &Map<String, Value>,
) -> Result<T, SchemaJsonError> {
    serde_json::from_value(Value::Object(json.clone()))
        .map_err(|e| invalid(type_name, "constraints", e.to_string()))
}

pub(crate) fn invalid(type_name: &str, field: &str, reason: impl Into<String>) -> SchemaJsonError {
    SchemaJsonError::InvalidField {
        type_name: type_name.to_string(),
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Error for a schema handed to the compiler of another type.
pub(crate) fn mismatch(type_name: &str, schema: &Schema) -> SchemaJsonError {
    invalid(
        type_name,
        "type",
        format!("schema of type ({}) given to the {type_name} compiler", schema.type_name()),
    )
}
