//! # Validator Master
//!
//! Dispatches compiled schema nodes to per-type validators by their type
//! name. A [`ValidatorFactory`] is registered per type and creates a
//! [`DataValidator`] bound to one schema node for each validation.
//!
//! Registration follows the compiler master: the first factory registered
//! for a type is kept, [`ValidatorMaster::replace_validator_factory`]
//! overwrites.

use dschema_core::{Schema, TopSchema, ValidationResult};
use serde_json::Value;

use crate::context::{FactorySet, ValidationContext};
use crate::options::ValidatorOptions;
use crate::types;

/// A validator bound to one compiled schema node.
pub trait DataValidator {
    /// Validate `data`; `None` stands for absent data.
    fn validate(&self, data: Option<&Value>, ctx: &mut ValidationContext<'_>) -> ValidationResult;
}

/// Creates validators for one schema type.
pub trait ValidatorFactory: Send + Sync {
    /// The type name this factory handles.
    fn type_name(&self) -> &str;

    /// Bind a validator to `schema`.
    fn create<'s>(&self, schema: &'s Schema) -> Box<dyn DataValidator + 's>;
}

/// Registry of validator factories plus the validation entry points.
pub struct ValidatorMaster {
    factories: FactorySet,
    options: ValidatorOptions,
}

impl std::fmt::Debug for ValidatorMaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        types.sort_unstable();
        f.debug_struct("ValidatorMaster")
            .field("types", &types)
            .field("options", &self.options)
            .finish()
    }
}

impl Default for ValidatorMaster {
    fn default() -> Self {
        Self::with_builtin(ValidatorOptions::default())
    }
}

impl ValidatorMaster {
    /// A master with no factories registered.
    pub fn new(options: ValidatorOptions) -> Self {
        Self {
            factories: FactorySet::new(),
            options,
        }
    }

    /// A master with every built-in factory registered.
    pub fn with_builtin(options: ValidatorOptions) -> Self {
        let mut master = Self::new(options);
        for factory in types::builtin_factories() {
            master.register_boxed(factory);
        }
        master
    }

    /// Register `factory` unless its type already has one.
    ///
    /// Returns whether the factory was inserted.
    pub fn register_validator_factory<F: ValidatorFactory + 'static>(&mut self, factory: F) -> bool {
        self.register_boxed(Box::new(factory))
    }

    fn register_boxed(&mut self, factory: Box<dyn ValidatorFactory>) -> bool {
        let type_name = factory.type_name().to_string();
        if self.factories.contains_key(&type_name) {
            tracing::warn!(type_name = %type_name, "validator factory already registered, ignoring");
            return false;
        }
        self.factories.insert(type_name, factory);
        true
    }

    /// Register `factory`, replacing any existing one for its type.
    pub fn replace_validator_factory<F: ValidatorFactory + 'static>(&mut self, factory: F) {
        let type_name = factory.type_name().to_string();
        self.factories.insert(type_name, Box::new(factory));
    }

    /// Whether a factory is registered for `type_name`.
    pub fn has_factory(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Options in effect.
    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    pub(crate) fn context<'a>(&'a self, top: Option<&'a TopSchema>) -> ValidationContext<'a> {
        ValidationContext::new(&self.factories, &self.options, top)
    }

    /// Validate `data` against a compiled top-level schema.
    ///
    /// `$ref`s resolve against `top`'s definitions and `$id`.
    pub fn validate_top(&self, top: &TopSchema, data: Option<&Value>) -> ValidationResult {
        let result = self.context(Some(top)).validate_data_schema(&top.schema, data);
        tracing::debug!(
            errors = result.errors().len(),
            warnings = result.warnings().len(),
            "validated top-level schema"
        );
        result
    }

    /// Validate `data` against a single schema node with no definitions.
    pub fn validate_data_schema(&self, schema: &Schema, data: Option<&Value>) -> ValidationResult {
        self.context(None).validate_data_schema(schema, data)
    }
}
