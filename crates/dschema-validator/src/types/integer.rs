//! `integer` validator.

use dschema_core::cover::cover_i64;
use dschema_core::json::stringify;
use dschema_core::schema::types;
use dschema_core::{Diagnostic, IntegerSchema, Schema, SchemaKind, ValidationResult};
use serde_json::Value;

use super::base::{base_validate, kind_mismatch};
use crate::context::ValidationContext;
use crate::master::{DataValidator, ValidatorFactory};

fn check(integer: &IntegerSchema, n: i64) -> Option<Diagnostic> {
    if let Some(min) = integer.minimum.filter(|min| *min > n) {
        return Some(Diagnostic::new(
            "minimum",
            format!("minimum value expected is {min}, but got {n}."),
        ));
    }
    if let Some(max) = integer.maximum.filter(|max| *max < n) {
        return Some(Diagnostic::new(
            "maximum",
            format!("maximum value expected is {max}, but got {n}."),
        ));
    }
    if let Some(min) = integer.exclusive_minimum.filter(|min| *min >= n) {
        return Some(Diagnostic::new(
            "exclusiveMinimum",
            format!("exclusiveMinimum value expected is {min}, but got {n}."),
        ));
    }
    if let Some(max) = integer.exclusive_maximum.filter(|max| *max <= n) {
        return Some(Diagnostic::new(
            "exclusiveMaximum",
            format!("exclusiveMaximum value expected is {max}, but got {n}."),
        ));
    }
    if let Some(values) = integer.enum_values.as_ref().filter(|v| !v.is_empty()) {
        if !values.contains(&n) {
            return Some(Diagnostic::new(
                "enum",
                format!("expected values are {values:?}, but got {n}."),
            ));
        }
    }
    None
}

/// Exact `i64` through [`cover_i64`]; `None` for fractions and overflow.
fn to_integer(value: &Value) -> Option<i64> {
    let covered = cover_i64(None, Some(value));
    if covered.has_error() {
        None
    } else {
        covered.value
    }
}

/// Validator of `integer` schemas; accepts integral numeric strings.
#[derive(Debug, Clone, Copy)]
pub struct IntegerValidator<'s> {
    schema: &'s Schema,
}

impl DataValidator for IntegerValidator<'_> {
    fn validate(&self, data: Option<&Value>, _ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let SchemaKind::Integer(integer) = &self.schema.kind else {
            return kind_mismatch(types::INTEGER, self.schema);
        };
        let mut result = base_validate(self.schema, data);
        let Some(value) = result.take_value() else {
            return result;
        };
        let n = match to_integer(&value) {
            Some(n) => n,
            None => {
                result.add_error(Diagnostic::new(
                    "type",
                    format!("expected an integer, but got ({}).", stringify(Some(&value))),
                ));
                return result;
            }
        };
        match check(integer, n) {
            Some(error) => {
                result.add_error(error);
            }
            None => {
                result.set_value(Value::from(n));
            }
        }
        result
    }
}

/// Creates [`IntegerValidator`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerValidatorFactory;

impl ValidatorFactory for IntegerValidatorFactory {
    fn type_name(&self) -> &str {
        types::INTEGER
    }

    fn create<'s>(&self, schema: &'s Schema) -> Box<dyn DataValidator + 's> {
        Box::new(IntegerValidator { schema })
    }
}
