//! # End-to-End Tests
//!
//! Drives [`SchemaMaster`] the way a caller would: raw schemas in (JSON or
//! YAML), compiled schemas and normalized data out. Includes a custom
//! `ipv4` type registered through the public extension points.

use anyhow::Result;
use dschema::dschema_core::cover::cover_boolean;
use dschema::dschema_core::StringFormat;
use dschema::dschema_validator::types::{base_validate, matches_format};
use dschema::{
    parse_raw, CompileContext, CompileResult, CustomSchema, DataValidator, Diagnostic, MasterConfig,
    Schema, SchemaCompiler, SchemaJsonError, SchemaKind, SchemaMaster, SourceFormat, TopSchema,
    ValidationContext, ValidationResult, ValidatorFactory,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn compile(master: &SchemaMaster, raw: Value) -> Result<TopSchema> {
    let result = master.compile(&raw);
    anyhow::ensure!(!result.has_error(), "compile errors: {:?}", result.errors());
    result
        .into_value()
        .ok_or_else(|| anyhow::anyhow!("schema compiled to nothing"))
}

// ---------------------------------------------------------------------------
// Custom type: ipv4
// ---------------------------------------------------------------------------

const IPV4: &str = "ipv4";

struct Ipv4Compiler;

impl SchemaCompiler for Ipv4Compiler {
    fn type_name(&self) -> &str {
        IPV4
    }

    fn compile(&self, raw: &Map<String, Value>, _ctx: &mut CompileContext<'_>) -> CompileResult<Schema> {
        let mut result = CompileResult::new();
        let required = cover_boolean(Some(false), raw.get("required"));
        if required.has_error() {
            result.add_error(Diagnostic::new("required", required.error_summary()));
        }
        let default = raw.get("default").filter(|v| !v.is_null()).cloned();
        let is_address = |v: &Value| v.as_str().is_some_and(|s| matches_format(StringFormat::Ipv4, s));
        if let Some(default) = default.as_ref().filter(|d| !is_address(d)) {
            result.add_error(Diagnostic::new(
                "default",
                format!("default must be an ipv4 address, but got ({default})."),
            ));
        }
        result.set_value(Schema {
            required: required.value.unwrap_or(false),
            default,
            kind: SchemaKind::Custom(CustomSchema {
                type_name: IPV4.to_string(),
                properties: Map::new(),
            }),
        });
        result
    }

    fn to_json(&self, schema: &Schema, _ctx: &CompileContext<'_>) -> Result<Value, SchemaJsonError> {
        let mut json = json!({"type": IPV4, "required": schema.required});
        if let (Some(default), Some(map)) = (&schema.default, json.as_object_mut()) {
            map.insert("default".to_string(), default.clone());
        }
        Ok(json)
    }

    fn parse_json(&self, json: &Map<String, Value>, _ctx: &CompileContext<'_>) -> Result<Schema, SchemaJsonError> {
        Ok(Schema {
            required: json.get("required").and_then(Value::as_bool).unwrap_or(false),
            default: json.get("default").filter(|v| !v.is_null()).cloned(),
            kind: SchemaKind::Custom(CustomSchema {
                type_name: IPV4.to_string(),
                properties: Map::new(),
            }),
        })
    }
}

struct Ipv4Validator<'s> {
    schema: &'s Schema,
}

impl DataValidator for Ipv4Validator<'_> {
    fn validate(&self, data: Option<&Value>, _ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let mut result = base_validate(self.schema, data);
        let Some(value) = result.take_value() else {
            return result;
        };
        match value.as_str().map(str::trim) {
            Some(address) if matches_format(StringFormat::Ipv4, address) => {
                result.set_value(Value::String(address.to_string()));
            }
            _ => {
                result.add_error(Diagnostic::new(
                    "format",
                    format!("expected an ipv4 address, but got ({value})."),
                ));
            }
        }
        result
    }
}

struct Ipv4ValidatorFactory;

impl ValidatorFactory for Ipv4ValidatorFactory {
    fn type_name(&self) -> &str {
        IPV4
    }

    fn create<'s>(&self, schema: &'s Schema) -> Box<dyn DataValidator + 's> {
        Box::new(Ipv4Validator { schema })
    }
}

fn master_with_ipv4() -> SchemaMaster {
    let mut master = SchemaMaster::new();
    master
        .register_compiler(Ipv4Compiler)
        .register_validator_factory(Ipv4ValidatorFactory);
    master
}

#[test]
fn test_custom_ipv4_type() -> Result<()> {
    init_tracing();
    let master = master_with_ipv4();
    let top = compile(&master, json!({
        "type": "object",
        "properties": {
            "host": {"type": "ipv4", "required": true},
            "gateway": {"type": "ipv4", "default": "10.0.0.1"},
        },
    }))?;

    let result = master.validate(&top, Some(&json!({"host": " 192.168.1.20 "})));
    assert_eq!(result.value(), Some(&json!({"host": "192.168.1.20", "gateway": "10.0.0.1"})));

    let result = master.validate(&top, Some(&json!({"host": "300.1.1.1"})));
    let flat = result.flatten_errors();
    assert_eq!(flat[0].constraint, "format");
    assert_eq!(flat[0].property.as_deref(), Some("host"));

    let json = master.to_json_top(&top)?;
    assert_eq!(master.parse_json_top(&json)?, top);
    Ok(())
}

#[test]
fn test_custom_type_unknown_without_registration() {
    let master = SchemaMaster::new();
    let result = master.compile(&json!({"type": "ipv4"}));
    assert_eq!(result.errors()[0].constraint, "type");

    let top = TopSchema::from_schema(Schema::new(SchemaKind::Custom(CustomSchema {
        type_name: IPV4.to_string(),
        properties: Map::new(),
    })));
    let result = master.validate(&top, Some(&json!("1.1.1.1")));
    assert_eq!(result.errors()[0].constraint, "type");
}

#[test]
fn test_custom_default_checked_at_compile() {
    let master = master_with_ipv4();
    let result = master.compile(&json!({"type": "ipv4", "default": "localhost"}));
    assert_eq!(result.errors()[0].constraint, "default");
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_yaml_schema_end_to_end() -> Result<()> {
    let raw = parse_raw(
        r##"
$id: "#/node"
type: object
properties:
  name:
    type: string
    required: true
    transform: [trim]
  children:
    type: array
    items:
      type: ref
      $ref: "#/node"
"##,
        SourceFormat::Yaml,
    )?;
    let master = SchemaMaster::new();
    let top = compile(&master, raw)?;

    let data = parse_raw(
        r#"{"name": " root ", "children": [{"name": "a"}, {"name": "b", "children": [{"children": []}]}]}"#,
        SourceFormat::Json,
    )?;
    let result = master.validate(&top, Some(&data));
    let flat = result.flatten_errors();
    assert_eq!(flat.len(), 1);
    assert_eq!(flat[0].property.as_deref(), Some("children.1.children.0.name"));
    Ok(())
}

#[test]
fn test_definitions_by_id_with_overrides() -> Result<()> {
    let master = SchemaMaster::new();
    let top = compile(&master, json!({
        "type": "object",
        "definitions": {
            "port": {"$id": "#/port", "type": "integer", "minimum": 1, "maximum": 65535},
        },
        "properties": {
            "http": {"type": "ref", "$ref": "#/port", "default": 80},
            "https": {"type": "ref", "$ref": "#/definitions/port", "required": true},
        },
    }))?;
    let result = master.validate(&top, Some(&json!({"https": "443"})));
    assert_eq!(result.value(), Some(&json!({"http": 80, "https": 443})));

    let result = master.validate(&top, Some(&json!({"https": 70000})));
    assert_eq!(result.flatten_errors()[0].constraint, "maximum");
    Ok(())
}

#[test]
fn test_registry_isolation_between_compiles() {
    let master = SchemaMaster::new();
    let first = master.compile(&json!({
        "type": "boolean",
        "definitions": {"flag": {"$id": "#/flag", "type": "boolean"}},
    }));
    assert!(!first.has_error());

    let second = master.compile(&json!({"type": "ref", "$ref": "#/flag"}));
    assert_eq!(second.errors()[0].constraint, "$ref");
}

#[test]
fn test_config_prefix_applies_to_both_phases() -> Result<()> {
    let master = SchemaMaster::with_config(MasterConfig {
        definition_path_prefix: "#/defs/".to_string(),
        ..MasterConfig::default()
    });
    let top = compile(&master, json!({
        "type": "ref",
        "$ref": "#/defs/list",
        "definitions": {
            "list": {
                "type": "object",
                "properties": {
                    "value": "integer",
                    "next": {"type": "ref", "$ref": "#/defs/list"},
                },
            },
        },
    }))?;
    let result = master.validate(&top, Some(&json!({"value": 1, "next": {"value": "2"}})));
    assert_eq!(result.value(), Some(&json!({"value": 1, "next": {"value": 2}})));
    Ok(())
}

#[test]
fn test_compile_is_deterministic() -> Result<()> {
    let master = SchemaMaster::new();
    let raw = json!({
        "type": "combine",
        "strategy": "any",
        "allOf": [{"type": "string", "pattern": "^[a-z]+$"}],
        "oneOf": ["integer", {"type": "number", "minimum": 0.5}],
    });
    assert_eq!(compile(&master, raw.clone())?, compile(&master, raw)?);
    Ok(())
}

#[test]
fn test_schema_json_round_trip() -> Result<()> {
    let master = SchemaMaster::new();
    let top = compile(&master, json!({
        "type": "object",
        "properties": {
            "code": {"type": "string", "pattern": "^[A-Z]{3}$", "format": ["email"], "transform": "uppercase"},
            "n([0-9]+)": {"type": "number", "nameType": "regex", "exclusiveMinimum": 0},
        },
        "propertyNames": {"type": "string", "minLength": 1},
    }))?;
    let json = master.to_json(&top.schema)?;
    assert_eq!(master.parse_json(&json)?, top.schema);
    Ok(())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn default_fills_absent_value(default in any::<i64>()) {
        let master = SchemaMaster::new();
        let result = master.compile_and_validate(&json!({"type": "integer", "default": default}), None);
        let expected = json!(default);
        prop_assert_eq!(result.value(), Some(&expected));
    }

    #[test]
    fn required_without_default_fails(type_name in prop::sample::select(vec![
        "boolean", "number", "integer", "string", "object",
    ])) {
        let master = SchemaMaster::new();
        let result = master.compile_and_validate(&json!({"type": type_name, "required": true}), None);
        prop_assert!(result.has_error());
        prop_assert!(result.value().is_none());
        let flat = result.flatten_errors();
        prop_assert_eq!(flat[0].constraint.as_str(), "required");
    }

    #[test]
    fn unique_arrays_accepted(items in prop::collection::btree_set(any::<i32>(), 0..8)) {
        let master = SchemaMaster::new();
        let data: Vec<i32> = items.into_iter().collect();
        let result = master.compile_and_validate(
            &json!({"type": "array", "unique": true, "items": "integer"}),
            Some(&json!(data)),
        );
        let expected = json!(data);
        prop_assert_eq!(result.value(), Some(&expected));
    }
}
