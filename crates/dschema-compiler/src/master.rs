//! # Compiler Master
//!
//! Dispatches raw schema nodes to per-type [`SchemaCompiler`]s by their
//! `type` discriminator.
//!
//! ## Registration
//!
//! - [`CompilerMaster::register_compiler`] keeps the first compiler
//!   registered for a type, so default registration is idempotent.
//! - [`CompilerMaster::replace_compiler`] overwrites unconditionally.
//!
//! ## Isolation
//!
//! Each public call builds a fresh [`CompileContext`]; the master itself
//! holds no per-compile state, so a shared `&CompilerMaster` can serve
//! overlapping compiles.

use dschema_core::{CompileResult, Schema, SchemaJsonError, TopSchema};
use serde_json::{Map, Value};

use crate::context::{CompileContext, CompilerSet};
use crate::options::CompilerOptions;
use crate::types;

/// A compiler for one schema type.
pub trait SchemaCompiler: Send + Sync {
    /// The `type` discriminator this compiler handles.
    fn type_name(&self) -> &str;

    /// Compile a normalized raw schema of this type.
    fn compile(&self, raw: &Map<String, Value>, ctx: &mut CompileContext<'_>) -> CompileResult<Schema>;

    /// Serialize a compiled schema of this type.
    fn to_json(&self, schema: &Schema, ctx: &CompileContext<'_>) -> Result<Value, SchemaJsonError>;

    /// Rebuild a compiled schema of this type from [`to_json`](Self::to_json) output.
    fn parse_json(
        &self,
        json: &Map<String, Value>,
        ctx: &CompileContext<'_>,
    ) -> Result<Schema, SchemaJsonError>;
}

/// Registry of per-type compilers plus the compile entry points.
pub struct CompilerMaster {
    compilers: CompilerSet,
    options: CompilerOptions,
}

impl std::fmt::Debug for CompilerMaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&str> = self.compilers.keys().map(String::as_str).collect();
        types.sort_unstable();
        f.debug_struct("CompilerMaster")
            .field("types", &types)
            .field("options", &self.options)
            .finish()
    }
}

impl Default for CompilerMaster {
    fn default() -> Self {
        Self::with_builtin(CompilerOptions::default())
    }
}

impl CompilerMaster {
    /// A master with no compilers registered.
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            compilers: CompilerSet::new(),
            options,
        }
    }

    /// A master with every built-in compiler registered.
    pub fn with_builtin(options: CompilerOptions) -> Self {
        let mut master = Self::new(options);
        for compiler in types::builtin_compilers() {
            master.register_boxed(compiler);
        }
        master
    }

    /// Register `compiler` unless its type already has one.
    ///
    /// Returns whether the compiler was inserted.
    pub fn register_compiler<C: SchemaCompiler + 'static>(&mut self, compiler: C) -> bool {
        self.register_boxed(Box::new(compiler))
    }

    fn register_boxed(&mut self, compiler: Box<dyn SchemaCompiler>) -> bool {
        let type_name = compiler.type_name().to_string();
        if self.compilers.contains_key(&type_name) {
            tracing::warn!(type_name = %type_name, "compiler already registered, ignoring");
            return false;
        }
        self.compilers.insert(type_name, compiler);
        true
    }

    /// Register `compiler`, replacing any existing one for its type.
    pub fn replace_compiler<C: SchemaCompiler + 'static>(&mut self, compiler: C) {
        let type_name = compiler.type_name().to_string();
        self.compilers.insert(type_name, Box::new(compiler));
    }

    /// Whether a compiler is registered for `type_name`.
    pub fn has_compiler(&self, type_name: &str) -> bool {
        self.compilers.contains_key(type_name)
    }

    /// Options in effect.
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    fn context(&self) -> CompileContext<'_> {
        CompileContext::new(&self.compilers, &self.options)
    }

    /// Compile a complete raw schema, including its `definitions` block.
    pub fn compile(&self, raw: &Value) -> CompileResult<TopSchema> {
        tracing::debug!("compiling top-level schema");
        self.context().compile_top_data_schema(raw)
    }

    /// Compile a single raw schema node with an empty definition registry.
    pub fn compile_data_schema(&self, raw: &Value) -> CompileResult<Schema> {
        self.context().compile_data_schema(raw)
    }

    /// Serialize a compiled schema node.
    pub fn to_json(&self, schema: &Schema) -> Result<Value, SchemaJsonError> {
        self.context().to_json(schema)
    }

    /// Rebuild a compiled schema node from [`to_json`](Self::to_json) output.
    pub fn parse_json(&self, json: &Value) -> Result<Schema, SchemaJsonError> {
        self.context().parse_json(json)
    }

    /// Serialize a top-level schema, including `$id` and `definitions`.
    pub fn to_json_top(&self, top: &TopSchema) -> Result<Value, SchemaJsonError> {
        self.context().to_json_top(top)
    }

    /// Rebuild a top-level schema from [`to_json_top`](Self::to_json_top) output.
    pub fn parse_json_top(&self, json: &Value) -> Result<TopSchema, SchemaJsonError> {
        self.context().parse_json_top(json)
    }
}
