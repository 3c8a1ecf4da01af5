//! `number` compiler.

use dschema_core::cover::{cover_array, cover_number};
use dschema_core::json::number_value;
use dschema_core::schema::types;
use dschema_core::{CompileResult, NumberSchema, Schema, SchemaJsonError, SchemaKind};
use serde_json::{Map, Value};

use super::base::{
    base_json, compile_required, cover_field, extend_json, mismatch, parse_base, parse_constraints,
};
use crate::context::CompileContext;
use crate::master::SchemaCompiler;

/// Compiler of `{"type": "number"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberCompiler;

impl SchemaCompiler for NumberCompiler {
    fn type_name(&self) -> &str {
        types::NUMBER
    }

    fn compile(&self, raw: &Map<String, Value>, _ctx: &mut CompileContext<'_>) -> CompileResult<Schema> {
        let mut result = CompileResult::new();
        let required = compile_required(raw, &mut result);
        let default = cover_field(&mut result, "default", cover_number(None, raw.get("default")));

        let mut bound = |name: &str| cover_field(&mut result, name, cover_number(None, raw.get(name)));
        let minimum = bound("minimum");
        let maximum = bound("maximum");
        let exclusive_minimum = bound("exclusiveMinimum");
        let exclusive_maximum = bound("exclusiveMaximum");

        let enum_values = cover_field(
            &mut result,
            "enum",
            cover_array(cover_number)(None, raw.get("enum")),
        )
        .filter(|values| !values.is_empty());

        result.set_value(Schema {
            required,
            default: default.map(number_value),
            kind: SchemaKind::Number(NumberSchema {
                minimum,
                maximum,
                exclusive_minimum,
                exclusive_maximum,
                enum_values,
            }),
        });
        result
    }

    fn to_json(&self, schema: &Schema, _ctx: &CompileContext<'_>) -> Result<Value, SchemaJsonError> {
        let SchemaKind::Number(number) = &schema.kind else {
            return Err(mismatch(types::NUMBER, schema));
        };
        let mut json = base_json(schema);
        extend_json(types::NUMBER, &mut json, number)?;
        Ok(Value::Object(json))
    }

    fn parse_json(&self, json: &Map<String, Value>, _ctx: &CompileContext<'_>) -> Result<Schema, SchemaJsonError> {
        let (required, default) = parse_base(types::NUMBER, json)?;
        Ok(Schema {
            required,
            default,
            kind: SchemaKind::Number(parse_constraints(types::NUMBER, json)?),
        })
    }
}
