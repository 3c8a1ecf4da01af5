//! `ref` compiler.
//!
//! A `$ref` names a registered definition by `$id` or path. The reference
//! node's own properties (other than `type` and `$ref`) override those of
//! the definition.
//!
//! - If the target is not on the compile stack, the merged raw schema is
//!   compiled at the reference site, producing a full inlined copy.
//! - If the target is on the compile stack the reference is recursive; a
//!   [`SchemaKind::Ref`] node is emitted and resolved during validation.
//!   This keeps the compiled tree finite. Such a node carries only
//!   `required` and `default`; any other override that changes the target
//!   is rejected rather than dropped.
//! - A `ref` definition that reaches itself through `ref` nodes alone can
//!   never resolve to a concrete type and is rejected as circular.

use dschema_core::cover::cover_boolean;
use dschema_core::json::stringify;
use dschema_core::schema::types;
use dschema_core::{CompileResult, Diagnostic, RefSchema, Schema, SchemaJsonError, SchemaKind};
use serde_json::{Map, Value};

use super::base::{base_json, cover_field, invalid, mismatch, parse_base, raw_default};
use crate::context::{inherit_raw_schema, CompileContext};
use crate::master::SchemaCompiler;
use crate::registry::DefinitionState;

/// Compiler of `{"type": "ref", "$ref": <id or path>}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefCompiler;

impl SchemaCompiler for RefCompiler {
    fn type_name(&self) -> &str {
        types::REF
    }

    fn compile(&self, raw: &Map<String, Value>, ctx: &mut CompileContext<'_>) -> CompileResult<Schema> {
        let mut result = CompileResult::new();
        let reference = match raw.get("$ref") {
            Some(Value::String(reference)) if !reference.is_empty() => reference.clone(),
            other => {
                result.add_error(Diagnostic::new(
                    "$ref",
                    format!("$ref must be a non-empty string, but got ({}).", stringify(other)),
                ));
                return result;
            }
        };

        let Some(path) = ctx.definitions().resolve(&reference).map(str::to_string) else {
            result.add_error(Diagnostic::new(
                "$ref",
                format!("no definition found for $ref({reference})."),
            ));
            return result;
        };
        let (Some(target), Some(state)) = (
            ctx.definitions().raw(&path).cloned(),
            ctx.definitions().state(&path),
        ) else {
            result.add_error(Diagnostic::new(
                "$ref",
                format!("no definition found for $ref({reference})."),
            ));
            return result;
        };

        let overrides: Map<String, Value> = raw
            .iter()
            .filter(|(key, _)| key.as_str() != "type" && key.as_str() != "$ref")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let merged = inherit_raw_schema(&target, &overrides);

        if state == DefinitionState::Compiling {
            if target.get("type").and_then(Value::as_str) == Some(types::REF) {
                result.add_error(Diagnostic::new(
                    "$ref",
                    format!("circular $ref({reference})."),
                ));
                return result;
            }
            let ignored: Vec<&str> = overrides
                .iter()
                .filter(|(key, value)| {
                    key.as_str() != "required"
                        && key.as_str() != "default"
                        && target.get(key.as_str()) != Some(*value)
                })
                .map(|(key, _)| key.as_str())
                .collect();
            if !ignored.is_empty() {
                result.add_error(Diagnostic::new(
                    "$ref",
                    format!(
                        "recursive $ref({reference}) only accepts required and default overrides, but got [{}].",
                        ignored.join(", ")
                    ),
                ));
                return result;
            }
            tracing::trace!(reference = %reference, "recursive $ref left for validation");
            let required = cover_field(
                &mut result,
                "required",
                cover_boolean(Some(false), merged.get("required")),
            )
            .unwrap_or(false);
            result.set_value(Schema {
                required,
                default: raw_default(&merged).cloned(),
                kind: SchemaKind::Ref(RefSchema { reference }),
            });
            return result;
        }

        ctx.mark(&path, DefinitionState::Compiling);
        let inlined = ctx.compile_raw(&merged);
        ctx.mark(&path, state);

        result.add_handle_result("$ref", &inlined, None);
        if let Some(schema) = inlined.into_value() {
            result.set_value(schema);
        }
        result
    }

    fn to_json(&self, schema: &Schema, _ctx: &CompileContext<'_>) -> Result<Value, SchemaJsonError> {
        let SchemaKind::Ref(reference) = &schema.kind else {
            return Err(mismatch(types::REF, schema));
        };
        let mut json = base_json(schema);
        json.insert("$ref".to_string(), Value::String(reference.reference.clone()));
        Ok(Value::Object(json))
    }

    fn parse_json(&self, json: &Map<String, Value>, _ctx: &CompileContext<'_>) -> Result<Schema, SchemaJsonError> {
        let (required, default) = parse_base(types::REF, json)?;
        let reference = json
            .get("$ref")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(types::REF, "$ref", "expected a string"))?;
        Ok(Schema {
            required,
            default,
            kind: SchemaKind::Ref(RefSchema {
                reference: reference.to_string(),
            }),
        })
    }
}
