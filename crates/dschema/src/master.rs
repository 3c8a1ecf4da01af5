//! The compile-and-validate entry point.

use dschema_compiler::{CompilerMaster, SchemaCompiler};
use dschema_core::{CompileResult, Diagnostic, Schema, SchemaJsonError, TopSchema, ValidationResult};
use dschema_validator::{ValidatorFactory, ValidatorMaster};
use serde_json::Value;

use crate::config::{ConfigError, MasterConfig};

/// A compiler master and a validator master sharing one configuration.
///
/// Both start with every built-in type registered. Custom types are added
/// with a compiler and a validator factory for the same type name.
#[derive(Debug)]
pub struct SchemaMaster {
    config: MasterConfig,
    compiler: CompilerMaster,
    validator: ValidatorMaster,
}

impl Default for SchemaMaster {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaMaster {
    /// A master with the default configuration.
    pub fn new() -> Self {
        Self::with_config(MasterConfig::default())
    }

    /// A master with an explicit configuration.
    pub fn with_config(config: MasterConfig) -> Self {
        Self {
            compiler: CompilerMaster::with_builtin(config.compiler_options()),
            validator: ValidatorMaster::with_builtin(config.validator_options()),
            config,
        }
    }

    /// A master configured from `DSCHEMA_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::with_config(MasterConfig::from_env()?))
    }

    pub fn config(&self) -> &MasterConfig {
        &self.config
    }

    /// Register a compiler; the first one registered for a type is kept.
    pub fn register_compiler<C: SchemaCompiler + 'static>(&mut self, compiler: C) -> &mut Self {
        self.compiler.register_compiler(compiler);
        self
    }

    /// Register a compiler, replacing any existing one for its type.
    pub fn replace_compiler<C: SchemaCompiler + 'static>(&mut self, compiler: C) -> &mut Self {
        self.compiler.replace_compiler(compiler);
        self
    }

    /// Register a validator factory; the first one registered for a type is kept.
    pub fn register_validator_factory<F: ValidatorFactory + 'static>(&mut self, factory: F) -> &mut Self {
        self.validator.register_validator_factory(factory);
        self
    }

    /// Register a validator factory, replacing any existing one for its type.
    pub fn replace_validator_factory<F: ValidatorFactory + 'static>(&mut self, factory: F) -> &mut Self {
        self.validator.replace_validator_factory(factory);
        self
    }

    /// Compile a raw schema, including its `definitions`.
    pub fn compile(&self, raw: &Value) -> CompileResult<TopSchema> {
        let result = self.compiler.compile(raw);
        tracing::debug!(
            errors = result.errors().len(),
            warnings = result.warnings().len(),
            "compiled schema"
        );
        result
    }

    /// Validate `data` against a compiled schema. `None` is absent data.
    pub fn validate(&self, schema: &TopSchema, data: Option<&Value>) -> ValidationResult {
        self.validator.validate_top(schema, data)
    }

    /// Compile `raw`, then validate `data` against it.
    ///
    /// Compile errors are reported under the `schema` constraint and stop
    /// validation.
    pub fn compile_and_validate(&self, raw: &Value, data: Option<&Value>) -> ValidationResult {
        let compiled = self.compile(raw);
        let mut result = ValidationResult::new();
        result.add_handle_result("schema", &compiled, None);
        if compiled.has_error() {
            return result;
        }
        let Some(top) = compiled.into_value() else {
            result.add_error(Diagnostic::new("schema", "schema compiled to nothing."));
            return result;
        };
        let validated = self.validate(&top, data);
        result.merge(&validated);
        if let Some(value) = validated.into_value() {
            result.set_value(value);
        }
        result
    }

    /// Serialize a compiled schema node.
    pub fn to_json(&self, schema: &Schema) -> Result<Value, SchemaJsonError> {
        self.compiler.to_json(schema)
    }

    /// Rebuild a compiled schema node from [`to_json`](Self::to_json) output.
    pub fn parse_json(&self, json: &Value) -> Result<Schema, SchemaJsonError> {
        self.compiler.parse_json(json)
    }

    /// Serialize a compiled top-level schema.
    pub fn to_json_top(&self, top: &TopSchema) -> Result<Value, SchemaJsonError> {
        self.compiler.to_json_top(top)
    }

    /// Rebuild a top-level schema from [`to_json_top`](Self::to_json_top) output.
    pub fn parse_json_top(&self, json: &Value) -> Result<TopSchema, SchemaJsonError> {
        self.compiler.parse_json_top(json)
    }
}
