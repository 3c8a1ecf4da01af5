//! `object` compiler.
//!
//! Each entry of `properties` is compiled as a nested schema. An entry may
//! carry `nameType: "regex"`, in which case its key is a pattern and the
//! compiled schema applies to every matching input key. Properties named in
//! `requiredProperties` default to `required: true`; the list is then
//! reconciled with the compiled `required` flags.

use std::collections::BTreeMap;

use dschema_core::cover::{cover_array, cover_boolean, cover_string};
use dschema_core::json::stringify;
use dschema_core::schema::types;
use dschema_core::{
    CompileResult, Diagnostic, ObjectSchema, Pattern, RegexNameProperty, Schema, SchemaJsonError,
    SchemaKind,
};
use serde_json::{Map, Value};

use super::base::{
    base_json, checked_default, compile_required, cover_field, invalid, mismatch, parse_base,
};
use crate::context::{inherit_raw_schema, CompileContext};
use crate::master::SchemaCompiler;

/// Compiler of `{"type": "object", ...}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectCompiler;

const NAME_TYPE_STRING: &str = "string";
const NAME_TYPE_REGEX: &str = "regex";

#[derive(Default)]
struct CompiledProperties {
    literal: BTreeMap<String, Schema>,
    regex: Vec<RegexNameProperty>,
}

fn compile_properties(
    raw: &Map<String, Value>,
    required_properties: &mut Vec<String>,
    ctx: &mut CompileContext<'_>,
    result: &mut CompileResult<Schema>,
) -> CompiledProperties {
    let mut compiled = CompiledProperties::default();
    let properties = match raw.get("properties") {
        None | Some(Value::Null) => return compiled,
        Some(Value::Object(properties)) => properties,
        Some(other) => {
            result.add_error(Diagnostic::new(
                "properties",
                format!("properties must be an object, but got ({}).", stringify(Some(other))),
            ));
            return compiled;
        }
    };

    for (name, property_raw) in properties {
        let property = match ctx.normalize(property_raw) {
            Ok(property) => property,
            Err(diagnostic) => {
                result.add_error(
                    Diagnostic::new("properties", diagnostic.reason.clone())
                        .with_property(name.as_str())
                        .with_traces(vec![diagnostic]),
                );
                continue;
            }
        };

        let listed = required_properties.iter().position(|p| p == name);
        let property = if listed.is_some() {
            let mut required = Map::new();
            required.insert("required".to_string(), Value::Bool(true));
            inherit_raw_schema(&required, &property)
        } else {
            property.into_owned()
        };

        let schema = ctx.compile_raw(&property);
        result.add_handle_result("properties", &schema, Some(name.as_str()));
        let Some(schema) = schema.into_value() else {
            continue;
        };

        match (listed, schema.required) {
            (None, true) => required_properties.push(name.clone()),
            (Some(index), false) => {
                required_properties.remove(index);
            }
            _ => {}
        }

        let name_type = cover_string(Some(NAME_TYPE_STRING.to_string()), property.get("nameType"));
        if name_type.has_error() {
            result.add_error(
                Diagnostic::new(
                    "properties",
                    format!("nameType is invalid of ({name}): {}", name_type.error_summary()),
                )
                .with_property(name.as_str()),
            );
            continue;
        }
        match name_type.value.as_deref() {
            Some(NAME_TYPE_REGEX) => match Pattern::new(name) {
                Ok(pattern) => compiled.regex.push(RegexNameProperty { pattern, schema }),
                Err(e) => {
                    result.add_error(
                        Diagnostic::new(
                            "properties",
                            format!("propertyName ({name}) is not a valid regex: {e}"),
                        )
                        .with_property(name.as_str()),
                    );
                }
            },
            Some(NAME_TYPE_STRING) | None => {
                compiled.literal.insert(name.clone(), schema);
            }
            Some(other) => {
                result.add_error(
                    Diagnostic::new(
                        "properties",
                        format!("nameType of ({name}) is unknown: nameType({other})"),
                    )
                    .with_property(name.as_str()),
                );
            }
        }
    }
    compiled
}

fn compile_property_names(
    raw: &Map<String, Value>,
    ctx: &mut CompileContext<'_>,
    result: &mut CompileResult<Schema>,
) -> Option<Box<Schema>> {
    let property_names = raw.get("propertyNames").filter(|v| !v.is_null())?;
    let compiled = ctx.compile_data_schema(property_names);
    result.add_handle_result("propertyNames", &compiled, None);
    let schema = compiled.into_value()?;
    if !matches!(schema.kind, SchemaKind::String(_)) {
        result.add_error(Diagnostic::new(
            "propertyNames",
            format!(
                "propertyNames must be a string schema, but got ({}).",
                schema.type_name()
            ),
        ));
        return None;
    }
    Some(Box::new(schema))
}

fn compile_dependencies(
    raw: &Map<String, Value>,
    result: &mut CompileResult<Schema>,
) -> Option<BTreeMap<String, Vec<String>>> {
    let dependencies = match raw.get("dependencies") {
        None | Some(Value::Null) => return None,
        Some(Value::Object(dependencies)) => dependencies,
        Some(other) => {
            result.add_error(Diagnostic::new(
                "dependencies",
                format!("dependencies must be an object, but got ({}).", stringify(Some(other))),
            ));
            return None;
        }
    };

    let mut compiled = BTreeMap::new();
    for (name, required) in dependencies {
        let covered = cover_array(cover_string)(None, Some(required));
        if covered.has_error() {
            result.add_error(
                Diagnostic::new("dependencies", covered.error_summary()).with_property(name.as_str()),
            );
            continue;
        }
        compiled.insert(name.clone(), covered.value.unwrap_or_default());
    }
    (!compiled.is_empty()).then_some(compiled)
}

impl SchemaCompiler for ObjectCompiler {
    fn type_name(&self) -> &str {
        types::OBJECT
    }

    fn compile(&self, raw: &Map<String, Value>, ctx: &mut CompileContext<'_>) -> CompileResult<Schema> {
        let mut result = CompileResult::new();
        let required = compile_required(raw, &mut result);
        let silent_ignore = cover_field(
            &mut result,
            "silentIgnore",
            cover_boolean(Some(false), raw.get("silentIgnore")),
        )
        .unwrap_or(false);
        let default = checked_default(raw, &mut result, "an object", Value::is_object);

        let mut required_properties = cover_field(
            &mut result,
            "requiredProperties",
            cover_array(cover_string)(Some(Vec::new()), raw.get("requiredProperties")),
        )
        .unwrap_or_default();

        let properties = compile_properties(raw, &mut required_properties, ctx, &mut result);
        let property_names = compile_property_names(raw, ctx, &mut result);
        let dependencies = compile_dependencies(raw, &mut result);

        let allow_additional_properties = cover_field(
            &mut result,
            "allowAdditionalProperties",
            cover_boolean(Some(property_names.is_some()), raw.get("allowAdditionalProperties")),
        )
        .unwrap_or(false);

        result.set_value(Schema {
            required,
            default,
            kind: SchemaKind::Object(ObjectSchema {
                properties: (!properties.literal.is_empty()).then_some(properties.literal),
                regex_name_properties: (!properties.regex.is_empty()).then_some(properties.regex),
                property_names,
                dependencies,
                required_properties,
                allow_additional_properties,
                silent_ignore,
            }),
        });
        result
    }

    fn to_json(&self, schema: &Schema, ctx: &CompileContext<'_>) -> Result<Value, SchemaJsonError> {
        let SchemaKind::Object(object) = &schema.kind else {
            return Err(mismatch(types::OBJECT, schema));
        };
        let mut json = base_json(schema);
        json.insert("silentIgnore".to_string(), Value::Bool(object.silent_ignore));
        json.insert(
            "allowAdditionalProperties".to_string(),
            Value::Bool(object.allow_additional_properties),
        );
        json.insert(
            "requiredProperties".to_string(),
            Value::Array(object.required_properties.iter().cloned().map(Value::String).collect()),
        );
        if let Some(properties) = &object.properties {
            let mut map = Map::new();
            for (name, property) in properties {
                map.insert(name.clone(), ctx.to_json(property)?);
            }
            json.insert("properties".to_string(), Value::Object(map));
        }
        if let Some(regex_properties) = &object.regex_name_properties {
            let mut items = Vec::with_capacity(regex_properties.len());
            for property in regex_properties {
                let mut item = Map::new();
                item.insert("pattern".to_string(), Value::String(property.pattern.source().to_string()));
                item.insert("schema".to_string(), ctx.to_json(&property.schema)?);
                items.push(Value::Object(item));
            }
            json.insert("regexNameProperties".to_string(), Value::Array(items));
        }
        if let Some(property_names) = &object.property_names {
            json.insert("propertyNames".to_string(), ctx.to_json(property_names)?);
        }
        if let Some(dependencies) = &object.dependencies {
            let dependencies = serde_json::to_value(dependencies)
                .map_err(|e| invalid(types::OBJECT, "dependencies", e.to_string()))?;
            json.insert("dependencies".to_string(), dependencies);
        }
        Ok(Value::Object(json))
    }

    fn parse_json(&self, json: &Map<String, Value>, ctx: &CompileContext<'_>) -> Result<Schema, SchemaJsonError> {
        let (required, default) = parse_base(types::OBJECT, json)?;
        let flag = |name: &str| match json.get(name) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(invalid(types::OBJECT, name, "expected a boolean")),
        };

        let required_properties = match json.get("requiredProperties") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| invalid(types::OBJECT, "requiredProperties", e.to_string()))?,
        };

        let properties = match json.get("properties") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => {
                let mut properties = BTreeMap::new();
                for (name, property) in map {
                    properties.insert(name.clone(), ctx.parse_json(property)?);
                }
                Some(properties)
            }
            Some(_) => return Err(invalid(types::OBJECT, "properties", "expected an object")),
        };

        let regex_name_properties = match json.get("regexNameProperties") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => {
                let mut regex_properties = Vec::with_capacity(items.len());
                for item in items {
                    let source = item
                        .get("pattern")
                        .and_then(Value::as_str)
                        .ok_or_else(|| invalid(types::OBJECT, "regexNameProperties", "missing pattern"))?;
                    let pattern = Pattern::new(source).map_err(|e| SchemaJsonError::InvalidPattern {
                        source_text: source.to_string(),
                        reason: e.to_string(),
                    })?;
                    let schema = item
                        .get("schema")
                        .ok_or_else(|| invalid(types::OBJECT, "regexNameProperties", "missing schema"))?;
                    regex_properties.push(RegexNameProperty {
                        pattern,
                        schema: ctx.parse_json(schema)?,
                    });
                }
                Some(regex_properties)
            }
            Some(_) => return Err(invalid(types::OBJECT, "regexNameProperties", "expected an array")),
        };

        let property_names = match json.get("propertyNames") {
            None | Some(Value::Null) => None,
            Some(value) => Some(Box::new(ctx.parse_json(value)?)),
        };

        let dependencies = match json.get("dependencies") {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                serde_json::from_value(value.clone())
                    .map_err(|e| invalid(types::OBJECT, "dependencies", e.to_string()))?,
            ),
        };

        Ok(Schema {
            required,
            default,
            kind: SchemaKind::Object(ObjectSchema {
                properties,
                regex_name_properties,
                property_names,
                dependencies,
                required_properties,
                allow_additional_properties: flag("allowAdditionalProperties")?,
                silent_ignore: flag("silentIgnore")?,
            }),
        })
    }
}
