//! `array` validator.

use dschema_core::json::stringify;
use dschema_core::schema::types;
use dschema_core::{Diagnostic, Schema, SchemaKind, ValidationResult};
use serde_json::Value;

use super::base::{base_validate, kind_mismatch};
use crate::context::ValidationContext;
use crate::master::{DataValidator, ValidatorFactory};

fn has_duplicates(items: &[Value]) -> bool {
    items
        .iter()
        .enumerate()
        .any(|(i, a)| items[i + 1..].iter().any(|b| a == b))
}

/// Validator of `array` schemas.
///
/// Every element is validated against `items`; a failing element is
/// reported under `items` with its index as the property.
#[derive(Debug, Clone, Copy)]
pub struct ArrayValidator<'s> {
    schema: &'s Schema,
}

impl DataValidator for ArrayValidator<'_> {
    fn validate(&self, data: Option<&Value>, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let SchemaKind::Array(array) = &self.schema.kind else {
            return kind_mismatch(types::ARRAY, self.schema);
        };
        let mut result = base_validate(self.schema, data);
        let Some(value) = result.take_value() else {
            return result;
        };
        let Some(items) = value.as_array() else {
            result.add_error(Diagnostic::new(
                "type",
                format!("expected an array, but got ({}).", stringify(Some(&value))),
            ));
            return result;
        };

        if array.unique && has_duplicates(items) {
            result.add_error(Diagnostic::new(
                "unique",
                format!("expected a unique array, but got ({}).", stringify(Some(&value))),
            ));
            return result;
        }

        let mut output = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_result = ctx.validate_data_schema(&array.items, Some(item));
            result.add_handle_result("items", &item_result, Some(i.to_string().as_str()));
            if !item_result.has_error() {
                output.push(item_result.into_value().unwrap_or(Value::Null));
            }
        }

        if !result.has_error() {
            result.set_value(Value::Array(output));
        }
        result
    }
}

/// Creates [`ArrayValidator`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayValidatorFactory;

impl ValidatorFactory for ArrayValidatorFactory {
    fn type_name(&self) -> &str {
        types::ARRAY
    }

    fn create<'s>(&self, schema: &'s Schema) -> Box<dyn DataValidator + 's> {
        Box::new(ArrayValidator { schema })
    }
}
