//! `array` compiler.

use dschema_core::cover::cover_boolean;
use dschema_core::schema::types;
use dschema_core::{ArraySchema, CompileResult, Diagnostic, Schema, SchemaJsonError, SchemaKind};
use serde_json::{Map, Value};

use super::base::{base_json, checked_default, compile_required, cover_field, invalid, mismatch, parse_base};
use crate::context::CompileContext;
use crate::master::SchemaCompiler;

/// Compiler of `{"type": "array", "items": <schema>}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayCompiler;

impl SchemaCompiler for ArrayCompiler {
    fn type_name(&self) -> &str {
        types::ARRAY
    }

    fn compile(&self, raw: &Map<String, Value>, ctx: &mut CompileContext<'_>) -> CompileResult<Schema> {
        let mut result = CompileResult::new();
        let required = compile_required(raw, &mut result);
        let unique = cover_field(&mut result, "unique", cover_boolean(Some(false), raw.get("unique")))
            .unwrap_or(false);
        let default = checked_default(raw, &mut result, "an array", Value::is_array);

        let items = match raw.get("items") {
            None | Some(Value::Null) => {
                result.add_error(Diagnostic::new("items", "items is required, but got (undefined)."));
                None
            }
            Some(items) => {
                let compiled = ctx.compile_data_schema(items);
                result.add_handle_result("items", &compiled, None);
                compiled.into_value()
            }
        };

        if let Some(items) = items {
            result.set_value(Schema {
                required,
                default,
                kind: SchemaKind::Array(ArraySchema {
                    items: Box::new(items),
                    unique,
                }),
            });
        }
        result
    }

    fn to_json(&self, schema: &Schema, ctx: &CompileContext<'_>) -> Result<Value, SchemaJsonError> {
        let SchemaKind::Array(array) = &schema.kind else {
            return Err(mismatch(types::ARRAY, schema));
        };
        let mut json = base_json(schema);
        json.insert("unique".to_string(), Value::Bool(array.unique));
        json.insert("items".to_string(), ctx.to_json(&array.items)?);
        Ok(Value::Object(json))
    }

    fn parse_json(&self, json: &Map<String, Value>, ctx: &CompileContext<'_>) -> Result<Schema, SchemaJsonError> {
        let (required, default) = parse_base(types::ARRAY, json)?;
        let unique = match json.get("unique") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(invalid(types::ARRAY, "unique", "expected a boolean")),
        };
        let items = json
            .get("items")
            .ok_or_else(|| invalid(types::ARRAY, "items", "missing"))?;
        Ok(Schema {
            required,
            default,
            kind: SchemaKind::Array(ArraySchema {
                items: Box::new(ctx.parse_json(items)?),
                unique,
            }),
        })
    }
}
