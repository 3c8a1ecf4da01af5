//! `null` validator.

use dschema_core::schema::types;
use dschema_core::{Schema, ValidationResult};
use serde_json::Value;

use super::base::{base_validate, type_error};
use crate::context::ValidationContext;
use crate::master::{DataValidator, ValidatorFactory};

/// Validator of `null` schemas.
///
/// An explicit JSON `null` is the only accepted value and satisfies
/// `required`. Missing data takes a `null` default when the schema has one,
/// and otherwise goes through the usual required handling.
#[derive(Debug, Clone, Copy)]
pub struct NullValidator<'s> {
    schema: &'s Schema,
}

impl DataValidator for NullValidator<'_> {
    fn validate(&self, data: Option<&Value>, _ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let data = data.or(self.schema.default.as_ref());
        if matches!(data, Some(Value::Null)) {
            let mut result = ValidationResult::new();
            result.set_value(Value::Null);
            return result;
        }
        let mut result = base_validate(self.schema, data);
        if let Some(value) = result.take_value() {
            type_error(&mut result, "null", &value);
        }
        result
    }
}

/// Creates [`NullValidator`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullValidatorFactory;

impl ValidatorFactory for NullValidatorFactory {
    fn type_name(&self) -> &str {
        types::NULL
    }

    fn create<'s>(&self, schema: &'s Schema) -> Box<dyn DataValidator + 's> {
        Box::new(NullValidator { schema })
    }
}
