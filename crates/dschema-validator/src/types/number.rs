//! `number` validator.

use dschema_core::cover::cover_number;
use dschema_core::json::{number_value, stringify};
use dschema_core::schema::types;
use dschema_core::{Diagnostic, NumberSchema, Schema, SchemaKind, ValidationResult};
use serde_json::Value;

use super::base::{base_validate, kind_mismatch};
use crate::context::ValidationContext;
use crate::master::{DataValidator, ValidatorFactory};

fn check(number: &NumberSchema, n: f64) -> Option<Diagnostic> {
    if let Some(min) = number.minimum.filter(|min| *min > n) {
        return Some(Diagnostic::new(
            "minimum",
            format!("minimum value expected is {min}, but got {n}."),
        ));
    }
    if let Some(max) = number.maximum.filter(|max| *max < n) {
        return Some(Diagnostic::new(
            "maximum",
            format!("maximum value expected is {max}, but got {n}."),
        ));
    }
    if let Some(min) = number.exclusive_minimum.filter(|min| *min >= n) {
        return Some(Diagnostic::new(
            "exclusiveMinimum",
            format!("exclusiveMinimum value expected is {min}, but got {n}."),
        ));
    }
    if let Some(max) = number.exclusive_maximum.filter(|max| *max <= n) {
        return Some(Diagnostic::new(
            "exclusiveMaximum",
            format!("exclusiveMaximum value expected is {max}, but got {n}."),
        ));
    }
    if let Some(values) = number.enum_values.as_ref().filter(|v| !v.is_empty()) {
        if !values.contains(&n) {
            let values: Vec<Value> = values.iter().copied().map(number_value).collect();
            return Some(Diagnostic::new(
                "enum",
                format!("expected values are {}, but got {n}.", Value::Array(values)),
            ));
        }
    }
    None
}

/// Validator of `number` schemas; accepts numeric strings.
#[derive(Debug, Clone, Copy)]
pub struct NumberValidator<'s> {
    schema: &'s Schema,
}

impl DataValidator for NumberValidator<'_> {
    fn validate(&self, data: Option<&Value>, _ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let SchemaKind::Number(number) = &self.schema.kind else {
            return kind_mismatch(types::NUMBER, self.schema);
        };
        let mut result = base_validate(self.schema, data);
        let Some(value) = result.take_value() else {
            return result;
        };
        let covered = cover_number(None, Some(&value));
        let n = match covered.value {
            Some(n) if !covered.has_error() => n,
            _ => {
                result.add_error(Diagnostic::new(
                    "type",
                    format!("expected a number, but got ({}).", stringify(Some(&value))),
                ));
                return result;
            }
        };
        match check(number, n) {
            Some(error) => {
                result.add_error(error);
            }
            None => {
                result.set_value(number_value(n));
            }
        }
        result
    }
}

/// Creates [`NumberValidator`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberValidatorFactory;

impl ValidatorFactory for NumberValidatorFactory {
    fn type_name(&self) -> &str {
        types::NUMBER
    }

    fn create<'s>(&self, schema: &'s Schema) -> Box<dyn DataValidator + 's> {
        Box::new(NumberValidator { schema })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::ValidatorMaster;

    fn validate(number: NumberSchema, data: Value) -> ValidationResult {
        let schema = Schema::new(SchemaKind::Number(number));
        ValidatorMaster::default().validate_data_schema(&schema, Some(&data))
    }

    #[test]
    fn test_numeric_string_coerced() {
        assert_eq!(validate(NumberSchema::default(), json!("1.5")).value(), Some(&json!(1.5)));
        assert_eq!(validate(NumberSchema::default(), json!(2)).value(), Some(&json!(2)));
        assert_eq!(validate(NumberSchema::default(), json!("x")).errors()[0].constraint, "type");
    }

    #[test]
    fn test_bounds() {
        let bounds = NumberSchema {
            minimum: Some(0.0),
            maximum: Some(10.0),
            ..NumberSchema::default()
        };
        assert!(!validate(bounds.clone(), json!(0)).has_error());
        assert!(!validate(bounds.clone(), json!(10)).has_error());
        assert_eq!(validate(bounds.clone(), json!(-0.5)).errors()[0].constraint, "minimum");
        assert_eq!(validate(bounds, json!(10.5)).errors()[0].reason, "maximum value expected is 10, but got 10.5.");
    }

    #[test]
    fn test_exclusive_bounds() {
        let bounds = NumberSchema {
            exclusive_minimum: Some(0.0),
            exclusive_maximum: Some(1.0),
            ..NumberSchema::default()
        };
        assert!(!validate(bounds.clone(), json!(0.5)).has_error());
        assert_eq!(validate(bounds.clone(), json!(0)).errors()[0].constraint, "exclusiveMinimum");
        assert_eq!(validate(bounds, json!(1)).errors()[0].constraint, "exclusiveMaximum");
    }

    #[test]
    fn test_enum() {
        let values = NumberSchema {
            enum_values: Some(vec![1.0, 2.5]),
            ..NumberSchema::default()
        };
        assert!(!validate(values.clone(), json!(2.5)).has_error());
        let result = validate(values, json!(3));
        assert_eq!(result.errors()[0].reason, "expected values are [1,2.5], but got 3.");
    }
}
