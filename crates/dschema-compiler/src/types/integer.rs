//! `integer` compiler.
//!
//! Integral values are read as `i64` without passing through `f64`, so
//! defaults, enum members, and bounds beyond 2^53 stay exact.
//!
//! A fractional bound is rounded inward so that integer comparisons stay
//! exact: `minimum` and `exclusiveMaximum` round up, `maximum` and
//! `exclusiveMinimum` round down. A bound changed by rounding is reported as
//! a warning; a bound outside the `i64` range is an error.

use dschema_core::cover::{cover_array, cover_i64, cover_number};
use dschema_core::json::exact_i64;
use dschema_core::schema::types;
use dschema_core::{CompileResult, Diagnostic, IntegerSchema, Schema, SchemaJsonError, SchemaKind};
use serde_json::{Map, Value};

use super::base::{
    base_json, compile_required, cover_field, extend_json, mismatch, parse_base, parse_constraints,
};
use crate::context::CompileContext;
use crate::master::SchemaCompiler;

/// Compiler of `{"type": "integer"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerCompiler;

fn rounded_bound(
    raw: &Map<String, Value>,
    result: &mut CompileResult<Schema>,
    name: &str,
    round: fn(f64) -> f64,
) -> Option<i64> {
    let exact = cover_i64(None, raw.get(name));
    if !exact.has_error() {
        return exact.value;
    }
    let n = cover_field(result, name, cover_number(None, raw.get(name)))?;
    let r = round(n);
    let Some(bound) = exact_i64(r) else {
        result.add_error(Diagnostic::new(
            name,
            format!("{name} ({n}) is outside the integer range."),
        ));
        return None;
    };
    if r != n {
        result.add_warning(Diagnostic::new(
            name,
            format!("{name} ({n}) is not an integer, rounded to ({r})."),
        ));
    }
    Some(bound)
}

impl SchemaCompiler for IntegerCompiler {
    fn type_name(&self) -> &str {
        types::INTEGER
    }

    fn compile(&self, raw: &Map<String, Value>, _ctx: &mut CompileContext<'_>) -> CompileResult<Schema> {
        let mut result = CompileResult::new();
        let required = compile_required(raw, &mut result);
        let default = cover_field(&mut result, "default", cover_i64(None, raw.get("default")));

        let minimum = rounded_bound(raw, &mut result, "minimum", f64::ceil);
        let maximum = rounded_bound(raw, &mut result, "maximum", f64::floor);
        let exclusive_minimum = rounded_bound(raw, &mut result, "exclusiveMinimum", f64::floor);
        let exclusive_maximum = rounded_bound(raw, &mut result, "exclusiveMaximum", f64::ceil);

        let enum_values = cover_field(
            &mut result,
            "enum",
            cover_array(cover_i64)(None, raw.get("enum")),
        )
        .filter(|values| !values.is_empty());

        result.set_value(Schema {
            required,
            default: default.map(Value::from),
            kind: SchemaKind::Integer(IntegerSchema {
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
        let SchemaKind::Integer(integer) = &schema.kind else {
            return Err(mismatch(types::INTEGER, schema));
        };
        let mut json = base_json(schema);
        extend_json(types::INTEGER, &mut json, integer)?;
        Ok(Value::Object(json))
    }

    fn parse_json(&self, json: &Map<String, Value>, _ctx: &CompileContext<'_>) -> Result<Schema, SchemaJsonError> {
        let (required, default) = parse_base(types::INTEGER, json)?;
        Ok(Schema {
            required,
            default,
            kind: SchemaKind::Integer(parse_constraints(types::INTEGER, json)?),
        })
    }
}
