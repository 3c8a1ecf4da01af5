//! `boolean` compiler.

use dschema_core::cover::cover_boolean;
use dschema_core::schema::types;
use dschema_core::{CompileResult, Schema, SchemaJsonError, SchemaKind};
use serde_json::{Map, Value};

use super::base::{base_json, compile_required, cover_field, mismatch, parse_base};
use crate::context::CompileContext;
use crate::master::SchemaCompiler;

/// Compiler of `{"type": "boolean"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanCompiler;

impl SchemaCompiler for BooleanCompiler {
    fn type_name(&self) -> &str {
        types::BOOLEAN
    }

    fn compile(&self, raw: &Map<String, Value>, _ctx: &mut CompileContext<'_>) -> CompileResult<Schema> {
        let mut result = CompileResult::new();
        let required = compile_required(raw, &mut result);
        let default = cover_field(&mut result, "default", cover_boolean(None, raw.get("default")));
        result.set_value(Schema {
            required,
            default: default.map(Value::Bool),
            kind: SchemaKind::Boolean,
        });
        result
    }

    fn to_json(&self, schema: &Schema, _ctx: &CompileContext<'_>) -> Result<Value, SchemaJsonError> {
        match schema.kind {
            SchemaKind::Boolean => Ok(Value::Object(base_json(schema))),
            _ => Err(mismatch(types::BOOLEAN, schema)),
        }
    }

    fn parse_json(&self, json: &Map<String, Value>, _ctx: &CompileContext<'_>) -> Result<Schema, SchemaJsonError> {
        let (required, default) = parse_base(types::BOOLEAN, json)?;
        Ok(Schema {
            required,
            default,
            kind: SchemaKind::Boolean,
        })
    }
}
