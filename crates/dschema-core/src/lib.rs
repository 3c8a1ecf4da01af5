//! # dschema-core — Foundational Types for dschema
//!
//! Shared vocabulary of the dschema workspace: the diagnostics model that
//! every compile and validate call reports through, the cover (coercion)
//! primitives, and the compiled schema model. Every other `dschema-*` crate
//! depends on this one; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Diagnostics are values.** Schema and data problems accumulate in a
//!    [`HandleResult`] as [`Diagnostic`]s. Rust `Result`s are reserved for
//!    programmer-facing failures ([`DschemaError`]).
//!
//! 2. **No value on error.** [`HandleResult::value`] hides the value while
//!    any error is recorded.
//!
//! 3. **Closed built-ins, open extension.** [`SchemaKind`] enumerates the
//!    built-in types and carries user-registered types as
//!    [`SchemaKind::Custom`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dschema-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug` and `Clone`.

pub mod cover;
pub mod error;
pub mod json;
pub mod result;
pub mod schema;

// Re-export primary types for ergonomic imports.
pub use cover::CoverResult;
pub use error::{DschemaError, RegistryError, SchemaJsonError};
pub use result::{CompileResult, Diagnostic, FlatDiagnostic, HandleResult, ValidationResult};
pub use schema::{
    ArraySchema, CombineSchema, CombineStrategy, CustomSchema, DefinitionSchema, IntegerSchema,
    NumberSchema, ObjectSchema, Pattern, RefSchema, RegexNameProperty, Schema, SchemaKind,
    StringFormat, StringSchema, StringTransform, TopSchema, DEFAULT_DEFINITION_PREFIX,
};
