//! # dschema — Data-Schema Compiler and Validator
//!
//! Compile a raw schema once, then validate any number of data values
//! against it:
//!
//! ```
//! use dschema::SchemaMaster;
//! use serde_json::json;
//!
//! let master = SchemaMaster::new();
//! let schema = master
//!     .compile(&json!({"type": "string", "transform": ["trim", "lowercase"]}))
//!     .into_value()
//!     .expect("valid schema");
//! let result = master.validate(&schema, Some(&json!(" Apple ")));
//! assert_eq!(result.value(), Some(&json!("apple")));
//! ```
//!
//! Both steps return a [`HandleResult`]: the value, if any, plus error and
//! warning [`Diagnostic`]s. A result carrying errors never exposes a value.
//!
//! ## Layout
//!
//! - [`dschema_core`]: diagnostics, cover functions, the compiled schema model.
//! - [`dschema_compiler`]: raw schema compilation and `$ref` resolution.
//! - [`dschema_validator`]: data validation.
//! - [`source`]: JSON/YAML loading; [`config`]: master configuration.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Library code never installs a tracing subscriber.

pub mod config;
pub mod master;
pub mod source;

pub use config::{ConfigError, MasterConfig};
pub use master::SchemaMaster;
pub use source::{load_file, parse_raw, ConversionError, LoadError, SourceFormat};

pub use dschema_compiler::{CompileContext, CompilerMaster, CompilerOptions, CopyMode, SchemaCompiler};
pub use dschema_core::{
    CompileResult, CustomSchema, Diagnostic, FlatDiagnostic, HandleResult, Schema, SchemaJsonError,
    SchemaKind, TopSchema, ValidationResult,
};
pub use dschema_validator::{
    DataValidator, ValidationContext, ValidatorFactory, ValidatorMaster, ValidatorOptions,
};

pub use dschema_compiler;
pub use dschema_core;
pub use dschema_validator;
