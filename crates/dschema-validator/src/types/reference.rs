//! `ref` validator.
//!
//! Only recursive references survive compilation as `ref` nodes. The node's
//! own `required`/`default` apply first, then present data is validated
//! against the referenced definition of the top schema.

use dschema_core::schema::types;
use dschema_core::{Schema, SchemaKind, ValidationResult};
use serde_json::Value;

use super::base::{base_validate, kind_mismatch};
use crate::context::ValidationContext;
use crate::master::{DataValidator, ValidatorFactory};

/// Validator of `ref` schemas.
#[derive(Debug, Clone, Copy)]
pub struct RefValidator<'s> {
    schema: &'s Schema,
}

impl DataValidator for RefValidator<'_> {
    fn validate(&self, data: Option<&Value>, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let SchemaKind::Ref(reference) = &self.schema.kind else {
            return kind_mismatch(types::REF, self.schema);
        };
        let mut result = base_validate(self.schema, data);
        let Some(value) = result.take_value() else {
            return result;
        };
        let target = ctx.validate_ref(&reference.reference, Some(&value));
        result.merge(&target);
        if let Some(value) = target.into_value() {
            result.set_value(value);
        }
        result
    }
}

/// Creates [`RefValidator`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefValidatorFactory;

impl ValidatorFactory for RefValidatorFactory {
    fn type_name(&self) -> &str {
        types::REF
    }

    fn create<'s>(&self, schema: &'s Schema) -> Box<dyn DataValidator + 's> {
        Box::new(RefValidator { schema })
    }
}
