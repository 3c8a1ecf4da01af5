//! `string` compiler.

use dschema_core::cover::{cover_array, cover_i64, cover_regex, cover_string};
use dschema_core::json::stringify;
use dschema_core::schema::types;
use dschema_core::{
    CompileResult, Diagnostic, Schema, SchemaJsonError, SchemaKind, StringFormat, StringSchema,
    StringTransform,
};
use serde_json::{Map, Value};

use super::base::{
    base_json, compile_required, cover_field, extend_json, mismatch, parse_base, parse_constraints,
};
use crate::context::CompileContext;
use crate::master::SchemaCompiler;

/// Compiler of `{"type": "string"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCompiler;

/// Read a field holding one name or an array of names.
fn names(raw: &Map<String, Value>, field: &str, result: &mut CompileResult<Schema>) -> Vec<String> {
    match raw.get(field) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(name)) => vec![name.clone()],
        Some(value @ Value::Array(_)) => {
            cover_field(result, field, cover_array(cover_string)(None, Some(value))).unwrap_or_default()
        }
        Some(other) => {
            result.add_error(Diagnostic::new(
                field,
                format!(
                    "{field} must be a string or an array of strings, but got ({}).",
                    stringify(Some(other))
                ),
            ));
            Vec::new()
        }
    }
}

/// Parse names with `parse`; unknown names are dropped with a warning.
fn known<T>(
    raw: &Map<String, Value>,
    field: &str,
    parse: fn(&str) -> Option<T>,
    result: &mut CompileResult<Schema>,
) -> Option<Vec<T>> {
    let mut known = Vec::new();
    for name in names(raw, field, result) {
        match parse(&name) {
            Some(item) => known.push(item),
            None => {
                result.add_warning(Diagnostic::new(
                    field,
                    format!("unsupported {field} ({name}), ignored."),
                ));
            }
        }
    }
    (!known.is_empty()).then_some(known)
}

fn length(raw: &Map<String, Value>, field: &str, result: &mut CompileResult<Schema>) -> Option<i64> {
    cover_field(result, field, cover_i64(None, raw.get(field)))
}

fn to_usize(n: i64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

impl SchemaCompiler for StringCompiler {
    fn type_name(&self) -> &str {
        types::STRING
    }

    fn compile(&self, raw: &Map<String, Value>, _ctx: &mut CompileContext<'_>) -> CompileResult<Schema> {
        let mut result = CompileResult::new();
        let required = compile_required(raw, &mut result);
        let default = cover_field(&mut result, "default", cover_string(None, raw.get("default")));
        let pattern = cover_field(&mut result, "pattern", cover_regex(None, raw.get("pattern")));
        let enum_values = cover_field(
            &mut result,
            "enum",
            cover_array(cover_string)(None, raw.get("enum")),
        )
        .filter(|values| !values.is_empty());

        let min_length = match length(raw, "minLength", &mut result) {
            Some(n) if n < 0 => {
                result.add_error(Diagnostic::new(
                    "minLength",
                    format!("minLength must be a non-negative integer, but got ({n})."),
                ));
                None
            }
            other => other.map(to_usize),
        };
        let max_length = match length(raw, "maxLength", &mut result) {
            Some(n) if n <= 0 => {
                result.add_error(Diagnostic::new(
                    "maxLength",
                    format!("maxLength must be a positive integer, but got ({n})."),
                ));
                None
            }
            Some(n) if min_length.is_some_and(|min| to_usize(n) < min) => {
                result.add_error(Diagnostic::new(
                    "maxLength",
                    format!(
                        "maxLength must be greater than or equal to minLength, but got ({n} < {}).",
                        min_length.unwrap_or_default()
                    ),
                ));
                None
            }
            other => other.map(to_usize),
        };

        let format = known(raw, "format", StringFormat::from_name, &mut result);
        let transform = known(raw, "transform", StringTransform::from_name, &mut result);

        result.set_value(Schema {
            required,
            default: default.map(Value::String),
            kind: SchemaKind::String(StringSchema {
                min_length,
                max_length,
                pattern,
                format,
                transform,
                enum_values,
            }),
        });
        result
    }

    fn to_json(&self, schema: &Schema, _ctx: &CompileContext<'_>) -> Result<Value, SchemaJsonError> {
        let SchemaKind::String(string) = &schema.kind else {
            return Err(mismatch(types::STRING, schema));
        };
        let mut json = base_json(schema);
        extend_json(types::STRING, &mut json, string)?;
        Ok(Value::Object(json))
    }

    fn parse_json(&self, json: &Map<String, Value>, _ctx: &CompileContext<'_>) -> Result<Schema, SchemaJsonError> {
        let (required, default) = parse_base(types::STRING, json)?;
        Ok(Schema {
            required,
            default,
            kind: SchemaKind::String(parse_constraints(types::STRING, json)?),
        })
    }
}
