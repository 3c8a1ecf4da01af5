//! `string` validator.

use std::sync::OnceLock;

use dschema_core::schema::types;
use dschema_core::{
    Diagnostic, Schema, SchemaKind, StringFormat, StringSchema, StringTransform, ValidationResult,
};
use regex::Regex;
use serde_json::Value;

use super::base::{base_validate, kind_mismatch, type_error};
use super::case::{camel_case, kebab_case, little_camel_case};
use crate::context::ValidationContext;
use crate::master::{DataValidator, ValidatorFactory};

const IPV4: &str = r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$";
const IPV6: &str = r"^(([0-9a-fA-F]{1,4}:){7,7}[0-9a-fA-F]{1,4}|([0-9a-fA-F]{1,4}:){1,7}:|([0-9a-fA-F]{1,4}:){1,6}:[0-9a-fA-F]{1,4}|([0-9a-fA-F]{1,4}:){1,5}(:[0-9a-fA-F]{1,4}){1,2}|([0-9a-fA-F]{1,4}:){1,4}(:[0-9a-fA-F]{1,4}){1,3}|([0-9a-fA-F]{1,4}:){1,3}(:[0-9a-fA-F]{1,4}){1,4}|([0-9a-fA-F]{1,4}:){1,2}(:[0-9a-fA-F]{1,4}){1,5}|[0-9a-fA-F]{1,4}:((:[0-9a-fA-F]{1,4}){1,6})|:((:[0-9a-fA-F]{1,4}){1,7}|:)|fe80:(:[0-9a-fA-F]{0,4}){0,4}%[0-9a-zA-Z]{1,}|::(ffff(:0{1,4}){0,1}:){0,1}((25[0-5]|(2[0-4]|1{0,1}[0-9]){0,1}[0-9])\.){3,3}(25[0-5]|(2[0-4]|1{0,1}[0-9]){0,1}[0-9])|([0-9a-fA-F]{1,4}:){1,4}:((25[0-5]|(2[0-4]|1{0,1}[0-9]){0,1}[0-9])\.){3,3}(25[0-5]|(2[0-4]|1{0,1}[0-9]){0,1}[0-9]))$";
const EMAIL: &str = r"^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$";

fn format_regex(format: StringFormat) -> Option<&'static Regex> {
    static IPV4_RE: OnceLock<Option<Regex>> = OnceLock::new();
    static IPV6_RE: OnceLock<Option<Regex>> = OnceLock::new();
    static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let (cell, source) = match format {
        StringFormat::Ipv4 => (&IPV4_RE, IPV4),
        StringFormat::Ipv6 => (&IPV6_RE, IPV6),
        StringFormat::Email => (&EMAIL_RE, EMAIL),
    };
    cell.get_or_init(|| Regex::new(source).ok()).as_ref()
}

/// Whether `value` is in the given format.
pub fn matches_format(format: StringFormat, value: &str) -> bool {
    format_regex(format).is_some_and(|re| re.is_match(value))
}

fn transform(value: String, transform: StringTransform) -> String {
    match transform {
        StringTransform::Trim => value.trim().to_string(),
        StringTransform::Lowercase => value.to_lowercase(),
        StringTransform::Uppercase => value.to_uppercase(),
        StringTransform::CamelCase => camel_case(&value),
        StringTransform::LittleCamelCase => little_camel_case(&value),
        StringTransform::KebabCase => kebab_case(&value),
    }
}

fn check(string: &StringSchema, value: &str) -> Option<Diagnostic> {
    let length = value.chars().count();
    if let Some(min) = string.min_length.filter(|min| *min > length) {
        return Some(Diagnostic::new(
            "minLength",
            format!("minLength expected is {min}, but got value ({value}) with length ({length})."),
        ));
    }
    if let Some(max) = string.max_length.filter(|max| *max < length) {
        return Some(Diagnostic::new(
            "maxLength",
            format!("maxLength expected is {max}, but got value ({value}) with length ({length})."),
        ));
    }
    if let Some(pattern) = string.pattern.as_ref().filter(|p| !p.is_match(value)) {
        return Some(Diagnostic::new(
            "pattern",
            format!("expected value pattern is ({}), but got ({value}).", pattern.source()),
        ));
    }
    if let Some(formats) = string.format.as_ref().filter(|f| !f.is_empty()) {
        if !formats.iter().any(|f| matches_format(*f, value)) {
            let names: Vec<Value> = formats
                .iter()
                .filter_map(|f| serde_json::to_value(f).ok())
                .collect();
            return Some(Diagnostic::new(
                "format",
                format!("not matched any of {}.", Value::Array(names)),
            ));
        }
    }
    if let Some(values) = string.enum_values.as_ref().filter(|v| !v.is_empty()) {
        if !values.iter().any(|v| v == value) {
            let values: Vec<Value> = values.iter().cloned().map(Value::String).collect();
            return Some(Diagnostic::new(
                "enum",
                format!("expected value should in the {}, but got ({value}).", Value::Array(values)),
            ));
        }
    }
    None
}

/// Validator of `string` schemas.
///
/// Transforms run in declared order before any constraint is checked.
/// Lengths count characters.
#[derive(Debug, Clone, Copy)]
pub struct StringValidator<'s> {
    schema: &'s Schema,
}

impl DataValidator for StringValidator<'_> {
    fn validate(&self, data: Option<&Value>, _ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let SchemaKind::String(string) = &self.schema.kind else {
            return kind_mismatch(types::STRING, self.schema);
        };
        let mut result = base_validate(self.schema, data);
        let Some(value) = result.take_value() else {
            return result;
        };
        let value = match value {
            Value::String(value) => value,
            other => {
                type_error(&mut result, "a string", &other);
                return result;
            }
        };

        let value = string
            .transform
            .iter()
            .flatten()
            .fold(value, |value, t| transform(value, *t));

        match check(string, &value) {
            Some(error) => {
                result.add_error(error);
            }
            None => {
                result.set_value(Value::String(value));
            }
        }
        result
    }
}

/// Creates [`StringValidator`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringValidatorFactory;

impl ValidatorFactory for StringValidatorFactory {
    fn type_name(&self) -> &str {
        types::STRING
    }

    fn create<'s>(&self, schema: &'s Schema) -> Box<dyn DataValidator + 's> {
        Box::new(StringValidator { schema })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dschema_core::Pattern;
    use serde_json::json;

    use crate::ValidatorMaster;

    fn string(constraints: StringSchema) -> Schema {
        Schema::new(SchemaKind::String(constraints))
    }

    fn validate(schema: &Schema, data: Value) -> ValidationResult {
        ValidatorMaster::default().validate_data_schema(schema, Some(&data))
    }

    #[test]
    fn test_transform_pipeline_in_order() {
        let schema = string(StringSchema {
            transform: Some(vec![StringTransform::Trim, StringTransform::Lowercase]),
            ..StringSchema::default()
        });
        assert_eq!(validate(&schema, json!(" Apple ")).value(), Some(&json!("apple")));

        let schema = string(StringSchema {
            transform: Some(vec![StringTransform::KebabCase, StringTransform::Uppercase]),
            ..StringSchema::default()
        });
        assert_eq!(validate(&schema, json!("helloWorld")).value(), Some(&json!("HELLO-WORLD")));
    }

    #[test]
    fn test_transform_runs_before_length_check() {
        let schema = string(StringSchema {
            transform: Some(vec![StringTransform::Trim]),
            max_length: Some(3),
            ..StringSchema::default()
        });
        assert_eq!(validate(&schema, json!("  abc  ")).value(), Some(&json!("abc")));
    }

    #[test]
    fn test_non_string_is_type_error() {
        let result = validate(&string(StringSchema::default()), json!(12));
        assert_eq!(result.errors()[0].constraint, "type");
        assert_eq!(result.errors()[0].reason, "expected a string, but got (12).");
    }

    #[test]
    fn test_lengths_count_chars() {
        let schema = string(StringSchema {
            min_length: Some(2),
            max_length: Some(3),
            ..StringSchema::default()
        });
        assert!(!validate(&schema, json!("日本")).has_error());
        assert_eq!(validate(&schema, json!("a")).errors()[0].constraint, "minLength");
        assert_eq!(validate(&schema, json!("abcd")).errors()[0].constraint, "maxLength");
    }

    #[test]
    fn test_pattern() {
        let schema = string(StringSchema {
            pattern: Some(Pattern::new("^[a-z]+$").unwrap()),
            ..StringSchema::default()
        });
        assert!(!validate(&schema, json!("abc")).has_error());
        let result = validate(&schema, json!("ab1"));
        assert_eq!(result.errors()[0].constraint, "pattern");
        assert_eq!(result.errors()[0].reason, "expected value pattern is (^[a-z]+$), but got (ab1).");
    }

    #[test]
    fn test_format_is_any_of() {
        let schema = string(StringSchema {
            format: Some(vec![StringFormat::Ipv4, StringFormat::Email]),
            ..StringSchema::default()
        });
        assert!(!validate(&schema, json!("192.168.0.1")).has_error());
        assert!(!validate(&schema, json!("someone@example.com")).has_error());
        let result = validate(&schema, json!("256.0.0.1"));
        assert_eq!(result.errors()[0].constraint, "format");
        assert_eq!(result.errors()[0].reason, r#"not matched any of ["ipv4","email"]."#);
    }

    #[test]
    fn test_format_regexes() {
        assert!(matches_format(StringFormat::Ipv6, "::1"));
        assert!(matches_format(StringFormat::Ipv6, "2001:db8::ff00:42:8329"));
        assert!(!matches_format(StringFormat::Ipv6, "2001:db8::g"));
        assert!(matches_format(StringFormat::Ipv4, "0.0.0.0"));
        assert!(!matches_format(StringFormat::Ipv4, "1.2.3"));
        assert!(!matches_format(StringFormat::Email, "Someone@Example.com"));
    }

    #[test]
    fn test_enum() {
        let schema = string(StringSchema {
            enum_values: Some(vec!["red".to_string(), "blue".to_string()]),
            ..StringSchema::default()
        });
        assert!(!validate(&schema, json!("red")).has_error());
        assert_eq!(validate(&schema, json!("green")).errors()[0].constraint, "enum");
    }

    #[test]
    fn test_default_is_transformed() {
        let mut schema = string(StringSchema {
            transform: Some(vec![StringTransform::Uppercase]),
            ..StringSchema::default()
        });
        schema.default = Some(json!("x"));
        let result = ValidatorMaster::default().validate_data_schema(&schema, None);
        assert_eq!(result.value(), Some(&json!("X")));
    }
}
