//! `boolean` validator.

use dschema_core::cover::cover_boolean;
use dschema_core::json::stringify;
use dschema_core::schema::types;
use dschema_core::{Diagnostic, Schema, ValidationResult};
use serde_json::Value;

use super::base::base_validate;
use crate::context::ValidationContext;
use crate::master::{DataValidator, ValidatorFactory};

/// Validator of `boolean` schemas; accepts `"true"`/`"false"` strings.
#[derive(Debug, Clone, Copy)]
pub struct BooleanValidator<'s> {
    schema: &'s Schema,
}

impl DataValidator for BooleanValidator<'_> {
    fn validate(&self, data: Option<&Value>, _ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let mut result = base_validate(self.schema, data);
        let Some(value) = result.take_value() else {
            return result;
        };
        let covered = cover_boolean(None, Some(&value));
        match covered.value {
            Some(b) if !covered.has_error() => {
                result.set_value(Value::Bool(b));
            }
            _ => {
                result.add_error(Diagnostic::new(
                    "type",
                    format!("expected a boolean, but got ({}).", stringify(Some(&value))),
                ));
            }
        }
        result
    }
}

/// Creates [`BooleanValidator`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanValidatorFactory;

impl ValidatorFactory for BooleanValidatorFactory {
    fn type_name(&self) -> &str {
        types::BOOLEAN
    }

    fn create<'s>(&self, schema: &'s Schema) -> Box<dyn DataValidator + 's> {
        Box::new(BooleanValidator { schema })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dschema_core::SchemaKind;
    use serde_json::json;

    use crate::ValidatorMaster;

    #[test]
    fn test_boolean_coercion() {
        let master = ValidatorMaster::default();
        let schema = Schema::new(SchemaKind::Boolean);
        assert_eq!(master.validate_data_schema(&schema, Some(&json!(true))).value(), Some(&json!(true)));
        assert_eq!(master.validate_data_schema(&schema, Some(&json!("FALSE"))).value(), Some(&json!(false)));
        let result = master.validate_data_schema(&schema, Some(&json!(1)));
        assert_eq!(result.errors()[0].constraint, "type");
        assert_eq!(result.errors()[0].reason, "expected a boolean, but got (1).");
    }
}
