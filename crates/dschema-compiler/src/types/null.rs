//! `null` compiler. A null schema accepts only an explicit JSON `null`; a
//! `default` other than `null` is rejected. Unlike other types, an explicit
//! `"default": null` is kept, so a required null schema can be satisfied by
//! its default.

use dschema_core::cover::cover_null;
use dschema_core::schema::types;
use dschema_core::{CompileResult, Schema, SchemaJsonError, SchemaKind};
use serde_json::{Map, Value};

use super::base::{base_json, compile_required, cover_field, mismatch, parse_base};
use crate::context::CompileContext;
use crate::master::SchemaCompiler;

/// Compiler of `{"type": "null"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCompiler;

impl SchemaCompiler for NullCompiler {
    fn type_name(&self) -> &str {
        types::NULL
    }

    fn compile(&self, raw: &Map<String, Value>, _ctx: &mut CompileContext<'_>) -> CompileResult<Schema> {
        let mut result = CompileResult::new();
        let required = compile_required(raw, &mut result);
        let default = cover_field(&mut result, "default", cover_null(None, raw.get("default")));
        result.set_value(Schema {
            required,
            default,
            kind: SchemaKind::Null,
        });
        result
    }

    fn to_json(&self, schema: &Schema, _ctx: &CompileContext<'_>) -> Result<Value, SchemaJsonError> {
        match schema.kind {
            SchemaKind::Null => Ok(Value::Object(base_json(schema))),
            _ => Err(mismatch(types::NULL, schema)),
        }
    }

    fn parse_json(&self, json: &Map<String, Value>, _ctx: &CompileContext<'_>) -> Result<Schema, SchemaJsonError> {
        let (required, _) = parse_base(types::NULL, json)?;
        Ok(Schema {
            required,
            default: json.get("default").filter(|v| v.is_null()).cloned(),
            kind: SchemaKind::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::CompilerMaster;

    #[test]
    fn test_explicit_null_default_is_kept() {
        let master = CompilerMaster::default();
        let result = master.compile_data_schema(&json!({"type": "null", "required": true, "default": null}));
        let schema = result.into_value().unwrap();
        assert_eq!(schema.default, Some(Value::Null));

        let json = master.to_json(&schema).unwrap();
        assert_eq!(json, json!({"type": "null", "required": true, "default": null}));
        assert_eq!(master.parse_json(&json).unwrap(), schema);
    }

    #[test]
    fn test_absent_default_stays_absent() {
        let result = CompilerMaster::default().compile_data_schema(&json!({"type": "null"}));
        assert_eq!(result.into_value().unwrap().default, None);
    }

    #[test]
    fn test_non_null_default_rejected() {
        let result = CompilerMaster::default().compile_data_schema(&json!({"type": "null", "default": 0}));
        assert_eq!(result.errors()[0].constraint, "default");
    }
}
