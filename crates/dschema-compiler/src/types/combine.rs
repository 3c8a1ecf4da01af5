//! `combine` compiler: `allOf`, `anyOf`, and `oneOf` groups joined by a
//! `strategy`.

use dschema_core::cover::cover_string;
use dschema_core::json::stringify;
use dschema_core::schema::types;
use dschema_core::{
    CombineSchema, CombineStrategy, CompileResult, Diagnostic, Schema, SchemaJsonError, SchemaKind,
};
use serde_json::{Map, Value};

use super::base::{base_json, compile_required, cover_field, invalid, mismatch, parse_base, raw_default};
use crate::context::CompileContext;
use crate::master::SchemaCompiler;

/// Compiler of `{"type": "combine", ...}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombineCompiler;

fn compile_group(
    raw: &Map<String, Value>,
    group: &str,
    ctx: &mut CompileContext<'_>,
    result: &mut CompileResult<Schema>,
) -> Option<Vec<Schema>> {
    let members = match raw.get(group) {
        None | Some(Value::Null) => return None,
        Some(Value::Array(members)) => members,
        Some(other) => {
            result.add_error(Diagnostic::new(
                group,
                format!("{group} must be an array, but got ({}).", stringify(Some(other))),
            ));
            return None;
        }
    };

    let mut compiled = Vec::with_capacity(members.len());
    for (i, member) in members.iter().enumerate() {
        let member = ctx.compile_data_schema(member);
        result.add_handle_result(group, &member, Some(i.to_string().as_str()));
        if let Some(schema) = member.into_value() {
            compiled.push(schema);
        }
    }
    (!compiled.is_empty()).then_some(compiled)
}

impl SchemaCompiler for CombineCompiler {
    fn type_name(&self) -> &str {
        types::COMBINE
    }

    fn compile(&self, raw: &Map<String, Value>, ctx: &mut CompileContext<'_>) -> CompileResult<Schema> {
        let mut result = CompileResult::new();
        let required = compile_required(raw, &mut result);

        let strategy = cover_field(
            &mut result,
            "strategy",
            cover_string(Some("all".to_string()), raw.get("strategy")),
        )
        .unwrap_or_default();
        let strategy = match CombineStrategy::from_name(&strategy) {
            Some(strategy) => strategy,
            None => {
                result.add_error(Diagnostic::new(
                    "strategy",
                    format!("unknown strategy ({strategy}), expected one of all, any, one."),
                ));
                CombineStrategy::default()
            }
        };

        let all_of = compile_group(raw, "allOf", ctx, &mut result);
        let any_of = compile_group(raw, "anyOf", ctx, &mut result);
        let one_of = compile_group(raw, "oneOf", ctx, &mut result);

        let declared = ["allOf", "anyOf", "oneOf"]
            .iter()
            .any(|group| matches!(raw.get(*group), Some(Value::Array(members)) if !members.is_empty()));
        if !declared {
            result.add_error(Diagnostic::new(
                "type",
                "combine schema must declare at least one of allOf, anyOf, oneOf.",
            ));
        }

        result.set_value(Schema {
            required,
            default: raw_default(raw).cloned(),
            kind: SchemaKind::Combine(CombineSchema {
                strategy,
                all_of,
                any_of,
                one_of,
            }),
        });
        result
    }

    fn to_json(&self, schema: &Schema, ctx: &CompileContext<'_>) -> Result<Value, SchemaJsonError> {
        let SchemaKind::Combine(combine) = &schema.kind else {
            return Err(mismatch(types::COMBINE, schema));
        };
        let mut json = base_json(schema);
        json.insert("strategy".to_string(), Value::String(combine.strategy.as_str().to_string()));
        for (group, members) in [
            ("allOf", &combine.all_of),
            ("anyOf", &combine.any_of),
            ("oneOf", &combine.one_of),
        ] {
            if let Some(members) = members {
                let members = members
                    .iter()
                    .map(|m| ctx.to_json(m))
                    .collect::<Result<Vec<_>, _>>()?;
                json.insert(group.to_string(), Value::Array(members));
            }
        }
        Ok(Value::Object(json))
    }

    fn parse_json(&self, json: &Map<String, Value>, ctx: &CompileContext<'_>) -> Result<Schema, SchemaJsonError> {
        let (required, default) = parse_base(types::COMBINE, json)?;
        let strategy = match json.get("strategy") {
            None | Some(Value::Null) => CombineStrategy::default(),
            Some(Value::String(s)) => CombineStrategy::from_name(s)
                .ok_or_else(|| invalid(types::COMBINE, "strategy", format!("unknown strategy {s}")))?,
            Some(_) => return Err(invalid(types::COMBINE, "strategy", "expected a string")),
        };
        let group = |name: &str| -> Result<Option<Vec<Schema>>, SchemaJsonError> {
            match json.get(name) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::Array(members)) => members
                    .iter()
                    .map(|m| ctx.parse_json(m))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Some),
                Some(_) => Err(invalid(types::COMBINE, name, "expected an array")),
            }
        };
        Ok(Schema {
            required,
            default,
            kind: SchemaKind::Combine(CombineSchema {
                strategy,
                all_of: group("allOf")?,
                any_of: group("anyOf")?,
                one_of: group("oneOf")?,
            }),
        })
    }
}
