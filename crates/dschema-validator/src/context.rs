//! Per-call validation state.

use std::collections::HashMap;

use dschema_core::json::stringify;
use dschema_core::{Diagnostic, Schema, TopSchema, ValidationResult};
use serde_json::Value;

use crate::master::ValidatorFactory;
use crate::options::ValidatorOptions;

pub(crate) type FactorySet = HashMap<String, Box<dyn ValidatorFactory>>;

/// State threaded through one validation call.
///
/// Holds the factory set, the options, the top schema that `$ref`s resolve
/// against, and the current `$ref` depth. Built fresh by every
/// [`ValidatorMaster`](crate::ValidatorMaster) entry point.
pub struct ValidationContext<'a> {
    factories: &'a FactorySet,
    options: &'a ValidatorOptions,
    top: Option<&'a TopSchema>,
    ref_depth: usize,
}

impl<'a> ValidationContext<'a> {
    pub(crate) fn new(
        factories: &'a FactorySet,
        options: &'a ValidatorOptions,
        top: Option<&'a TopSchema>,
    ) -> Self {
        Self {
            factories,
            options,
            top,
            ref_depth: 0,
        }
    }

    /// Options in effect.
    pub fn options(&self) -> &ValidatorOptions {
        self.options
    }

    /// Number of lazy `$ref`s currently being followed.
    pub fn ref_depth(&self) -> usize {
        self.ref_depth
    }

    /// Validate `data` with the validator registered for `schema`'s type.
    pub fn validate_data_schema(&mut self, schema: &Schema, data: Option<&Value>) -> ValidationResult {
        let factories = self.factories;
        let type_name = schema.type_name();
        let Some(factory) = factories.get(type_name) else {
            let mut result = ValidationResult::new();
            result.add_error(Diagnostic::new(
                "type",
                format!("unknown schema type: {}.", stringify(Some(&Value::String(type_name.to_string())))),
            ));
            return result;
        };
        tracing::trace!(type_name = %type_name, "validating node");
        let validator = factory.create(schema);
        validator.validate(data, self)
    }

    /// Look up the definition named by `reference` in the top schema.
    pub fn resolve_ref(&self, reference: &str) -> Option<&'a Schema> {
        self.top?
            .definition(reference, &self.options.definition_path_prefix)
    }

    /// Validate `data` against the definition named by `reference`.
    ///
    /// Fails with a `$ref` error when the reference does not resolve or
    /// when more than `max_ref_depth` references are nested.
    pub fn validate_ref(&mut self, reference: &str, data: Option<&Value>) -> ValidationResult {
        if self.ref_depth >= self.options.max_ref_depth {
            let mut result = ValidationResult::new();
            result.add_error(Diagnostic::new(
                "$ref",
                format!(
                    "$ref({reference}) nested deeper than the limit ({}).",
                    self.options.max_ref_depth
                ),
            ));
            return result;
        }
        let Some(target) = self.resolve_ref(reference) else {
            let mut result = ValidationResult::new();
            result.add_error(Diagnostic::new(
                "$ref",
                format!("no definition found for $ref({reference})."),
            ));
            return result;
        };

        self.ref_depth += 1;
        let result = self.validate_data_schema(target, data);
        self.ref_depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dschema_core::{DefinitionSchema, RefSchema, SchemaKind};
    use serde_json::json;

    use crate::ValidatorMaster;

    fn top_with_definition() -> TopSchema {
        let mut top = TopSchema::from_schema(Schema::new(SchemaKind::Boolean));
        top.id = Some("#/root".to_string());
        top.definitions.insert(
            "flag".to_string(),
            DefinitionSchema {
                id: Some("#/flag".to_string()),
                schema: Schema::new(SchemaKind::Boolean),
            },
        );
        top
    }

    #[test]
    fn test_resolve_ref_by_path_id_and_top() {
        let master = ValidatorMaster::default();
        let top = top_with_definition();
        let ctx = master.context(Some(&top));
        assert!(ctx.resolve_ref("#/definitions/flag").is_some());
        assert!(ctx.resolve_ref("#/flag").is_some());
        assert!(ctx.resolve_ref("#/root").is_some());
        assert!(ctx.resolve_ref("#/missing").is_none());
    }

    #[test]
    fn test_resolve_ref_without_top() {
        let master = ValidatorMaster::default();
        let ctx = master.context(None);
        assert!(ctx.resolve_ref("#/definitions/flag").is_none());
    }

    #[test]
    fn test_unknown_type_is_type_error() {
        let master = ValidatorMaster::new(ValidatorOptions::default());
        let mut ctx = master.context(None);
        let result = ctx.validate_data_schema(&Schema::new(SchemaKind::Boolean), Some(&json!(true)));
        assert_eq!(result.errors()[0].constraint, "type");
        assert_eq!(result.errors()[0].reason, "unknown schema type: boolean.");
    }

    #[test]
    fn test_ref_depth_is_restored() {
        let master = ValidatorMaster::default();
        let top = top_with_definition();
        let mut ctx = master.context(Some(&top));
        let result = ctx.validate_ref("#/flag", Some(&json!("true")));
        assert_eq!(result.value(), Some(&json!(true)));
        assert_eq!(ctx.ref_depth(), 0);
    }

    #[test]
    fn test_self_ref_hits_depth_limit() {
        let mut top = TopSchema::from_schema(Schema::new(SchemaKind::Ref(RefSchema {
            reference: "#/loop".to_string(),
        })));
        top.id = Some("#/loop".to_string());
        let options = ValidatorOptions {
            max_ref_depth: 4,
            ..ValidatorOptions::default()
        };
        let master = ValidatorMaster::with_builtin(options);
        let result = master.validate_top(&top, Some(&json!(1)));
        assert!(result.has_error());
        let flat = result.flatten_errors();
        assert_eq!(flat[0].constraint, "$ref");
        assert!(flat[0].reason.contains("limit (4)"));
    }
}
