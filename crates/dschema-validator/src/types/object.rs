//! `object` validator.
//!
//! Declared properties are validated first, each against its own value
//! (a missing field still goes through default and required handling).
//! Remaining input keys are then matched against regex-named properties;
//! anything left is an additional property, kept only when the schema
//! allows additional properties and the key passes `propertyNames`.
//! `dependencies` are checked last, on the output object.

use dschema_core::json::{is_absent, stringify};
use dschema_core::schema::types;
use dschema_core::{Diagnostic, ObjectSchema, Schema, SchemaKind, ValidationResult};
use serde_json::{Map, Value};

use super::base::{base_validate, kind_mismatch};
use crate::context::ValidationContext;
use crate::master::{DataValidator, ValidatorFactory};

fn is_declared(object: &ObjectSchema, key: &str) -> bool {
    object
        .properties
        .as_ref()
        .is_some_and(|properties| properties.contains_key(key))
}

fn regex_property<'o>(object: &'o ObjectSchema, key: &str) -> Option<&'o Schema> {
    object
        .regex_name_properties
        .iter()
        .flatten()
        .find(|property| property.pattern.is_match(key))
        .map(|property| &property.schema)
}

/// Whether an additional property named `key` is kept; a rejection is
/// recorded as a warning.
fn accept_additional(
    object: &ObjectSchema,
    key: &str,
    ctx: &mut ValidationContext<'_>,
    result: &mut ValidationResult,
) -> bool {
    if !object.allow_additional_properties {
        if !object.silent_ignore {
            result.add_warning(
                Diagnostic::new(
                    "properties",
                    format!("property({key}) is not defined, ignored (allowAdditionalProperties is false)."),
                )
                .with_property(key),
            );
        }
        return false;
    }
    let Some(property_names) = &object.property_names else {
        return true;
    };
    let name = ctx.validate_data_schema(property_names, Some(&Value::String(key.to_string())));
    if !name.has_error() {
        return true;
    }
    if !object.silent_ignore {
        result.add_warning(
            Diagnostic::new(
                "propertyNames",
                format!("property({key}) does not satisfy propertyNames, ignored."),
            )
            .with_property(key)
            .with_traces(name.errors().to_vec()),
        );
    }
    false
}

fn check_dependencies(object: &ObjectSchema, output: &Map<String, Value>, result: &mut ValidationResult) {
    let Some(dependencies) = &object.dependencies else {
        return;
    };
    for (key, required) in dependencies {
        if is_absent(output.get(key)) {
            continue;
        }
        if let Some(missing) = required.iter().find(|dep| is_absent(output.get(dep.as_str()))) {
            let required: Vec<Value> = required.iter().cloned().map(Value::String).collect();
            result.add_error(
                Diagnostic::new(
                    "dependencies",
                    format!("{key} depend on {}, but {missing} is absent.", Value::Array(required)),
                )
                .with_property(key.as_str()),
            );
        }
    }
}

/// Validator of `object` schemas.
#[derive(Debug, Clone, Copy)]
pub struct ObjectValidator<'s> {
    schema: &'s Schema,
}

impl DataValidator for ObjectValidator<'_> {
    fn validate(&self, data: Option<&Value>, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let SchemaKind::Object(object) = &self.schema.kind else {
            return kind_mismatch(types::OBJECT, self.schema);
        };
        let mut result = base_validate(self.schema, data);
        let Some(value) = result.take_value() else {
            return result;
        };
        let Some(input) = value.as_object() else {
            result.add_error(Diagnostic::new(
                "type",
                format!("expected an object, but got ({}).", stringify(Some(&value))),
            ));
            return result;
        };

        let mut output = Map::new();
        for (name, property) in object.properties.iter().flatten() {
            let property_result = ctx.validate_data_schema(property, input.get(name));
            result.add_handle_result("properties", &property_result, Some(name.as_str()));
            if let Some(value) = property_result.into_value() {
                output.insert(name.clone(), value);
            }
        }

        for (key, field) in input {
            if is_declared(object, key) {
                continue;
            }
            if let Some(schema) = regex_property(object, key) {
                let property_result = ctx.validate_data_schema(schema, Some(field));
                result.add_handle_result("properties", &property_result, Some(key.as_str()));
                if let Some(value) = property_result.into_value() {
                    output.insert(key.clone(), value);
                }
                continue;
            }
            if accept_additional(object, key, ctx, &mut result) {
                output.insert(key.clone(), field.clone());
            }
        }

        if result.has_error() {
            return result;
        }
        check_dependencies(object, &output, &mut result);
        if !result.has_error() {
            result.set_value(Value::Object(output));
        }
        result
    }
}

/// Creates [`ObjectValidator`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectValidatorFactory;

impl ValidatorFactory for ObjectValidatorFactory {
    fn type_name(&self) -> &str {
        types::OBJECT
    }

    fn create<'s>(&self, schema: &'s Schema) -> Box<dyn DataValidator + 's> {
        Box::new(ObjectValidator { schema })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use dschema_core::{IntegerSchema, Pattern, RegexNameProperty, StringSchema};
    use serde_json::json;

    use crate::ValidatorMaster;

    fn string(required: bool) -> Schema {
        let mut schema = Schema::new(SchemaKind::String(StringSchema::default()));
        schema.required = required;
        schema
    }

    fn object(object: ObjectSchema) -> Schema {
        Schema::new(SchemaKind::Object(object))
    }

    fn person() -> ObjectSchema {
        let mut properties = BTreeMap::new();
        properties.insert("name".to_string(), string(true));
        properties.insert("email".to_string(), string(false));
        properties.insert("age".to_string(), Schema::new(SchemaKind::Integer(IntegerSchema::default())));
        properties.insert("gender".to_string(), string(false));
        let mut dependencies = BTreeMap::new();
        dependencies.insert("email".to_string(), vec!["age".to_string(), "gender".to_string()]);
        ObjectSchema {
            properties: Some(properties),
            dependencies: Some(dependencies),
            required_properties: vec!["name".to_string()],
            ..ObjectSchema::default()
        }
    }

    fn validate(schema: &Schema, data: Value) -> ValidationResult {
        ValidatorMaster::default().validate_data_schema(schema, Some(&data))
    }

    #[test]
    fn test_dependencies() {
        let schema = object(person());
        let result = validate(&schema, json!({"name": "x", "email": "a@b.com"}));
        assert_eq!(result.errors()[0].constraint, "dependencies");
        assert_eq!(
            result.errors()[0].reason,
            r#"email depend on ["age","gender"], but age is absent."#
        );

        let data = json!({"name": "x", "email": "a@b.com", "age": 3, "gender": "f"});
        assert_eq!(validate(&schema, data.clone()).value(), Some(&data));
    }

    #[test]
    fn test_missing_required_property_path() {
        let result = validate(&object(person()), json!({"age": 3}));
        let flat = result.flatten_errors();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].constraint, "required");
        assert_eq!(flat[0].property.as_deref(), Some("name"));
    }

    #[test]
    fn test_additional_properties_dropped_with_warning() {
        let result = validate(&object(person()), json!({"name": "x", "extra": 1}));
        assert_eq!(result.value(), Some(&json!({"name": "x"})));
        assert_eq!(result.warnings()[0].constraint, "properties");
        assert_eq!(result.warnings()[0].property.as_deref(), Some("extra"));
    }

    #[test]
    fn test_silent_ignore() {
        let schema = object(ObjectSchema {
            silent_ignore: true,
            ..person()
        });
        let result = validate(&schema, json!({"name": "x", "extra": 1}));
        assert_eq!(result.value(), Some(&json!({"name": "x"})));
        assert!(!result.has_warning());
    }

    #[test]
    fn test_property_names_filter_additional_keys() {
        let names = Schema::new(SchemaKind::String(StringSchema {
            pattern: Some(Pattern::new("^x-").unwrap()),
            ..StringSchema::default()
        }));
        let schema = object(ObjectSchema {
            property_names: Some(Box::new(names)),
            allow_additional_properties: true,
            ..person()
        });
        let result = validate(&schema, json!({"name": "n", "x-trace": 1, "other": 2}));
        assert_eq!(result.value(), Some(&json!({"name": "n", "x-trace": 1})));
        assert_eq!(result.warnings()[0].constraint, "propertyNames");
        assert_eq!(result.flatten_warnings()[0].property.as_deref(), Some("other"));
    }

    #[test]
    fn test_regex_named_properties() {
        let schema = object(ObjectSchema {
            regex_name_properties: Some(vec![RegexNameProperty {
                pattern: Pattern::new("^n[0-9]+$").unwrap(),
                schema: Schema::new(SchemaKind::Integer(IntegerSchema::default())),
            }]),
            ..ObjectSchema::default()
        });
        let result = validate(&schema, json!({"n1": "1", "n2": 2}));
        assert_eq!(result.value(), Some(&json!({"n1": 1, "n2": 2})));

        let result = validate(&schema, json!({"n1": "one"}));
        assert_eq!(result.flatten_errors()[0].property.as_deref(), Some("n1"));
    }

    #[test]
    fn test_defaults_fill_missing_properties() {
        let mut properties = BTreeMap::new();
        let mut count = Schema::new(SchemaKind::Integer(IntegerSchema::default()));
        count.default = Some(json!(0));
        properties.insert("count".to_string(), count);
        let schema = object(ObjectSchema {
            properties: Some(properties),
            ..ObjectSchema::default()
        });
        assert_eq!(validate(&schema, json!({})).value(), Some(&json!({"count": 0})));
    }

    #[test]
    fn test_not_an_object() {
        let result = validate(&object(person()), json!([1]));
        assert_eq!(result.errors()[0].constraint, "type");
    }
}
