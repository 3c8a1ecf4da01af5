//! # dschema-compiler — Raw Schema Compilation
//!
//! Turns user-authored raw schemas (plain JSON values) into the typed
//! [`Schema`](dschema_core::Schema) model.
//!
//! ## Pipeline
//!
//! 1. [`CompilerMaster::compile`] creates a [`CompileContext`] with an
//!    empty [`DefinitionRegistry`].
//! 2. Every entry of the top-level `definitions` block is registered before
//!    anything is compiled, so `$ref`s may point forward or at themselves.
//! 3. Definitions are compiled, then the body. Diagnostics of a failing
//!    definition are attached under `definitions` and compilation continues.
//! 4. The context, and with it the registry, is dropped on return.
//!
//! Nodes are dispatched on their `type` field to a registered
//! [`SchemaCompiler`]; custom types plug in through
//! [`CompilerMaster::register_compiler`] and
//! [`CompilerMaster::replace_compiler`].
//!
//! ## Crate Policy
//!
//! - Depends only on `dschema-core` internally.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Schema problems are reported as diagnostics, never as `Err`.

pub mod context;
pub mod master;
pub mod options;
pub mod registry;
pub mod types;

pub use context::{inherit_raw_schema, CompileContext};
pub use master::{CompilerMaster, SchemaCompiler};
pub use options::{CompilerOptions, CopyMode};
pub use registry::{DefinitionRegistry, DefinitionState};
