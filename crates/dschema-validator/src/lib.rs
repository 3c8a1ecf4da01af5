//! # dschema-validator — Data Validation
//!
//! Validates JSON data against compiled [`Schema`](dschema_core::Schema)s
//! and produces the normalized value: defaults filled in, strings
//! transformed, numeric strings coerced, undeclared fields dropped.
//!
//! ## Dispatch
//!
//! [`ValidatorMaster`] looks up a [`ValidatorFactory`] by the schema node's
//! type name and asks it for a [`DataValidator`] bound to that node.
//! Nested nodes are validated through the [`ValidationContext`] passed to
//! every validator, which also resolves the `ref` nodes left behind by
//! recursive schemas against the top schema being validated.
//!
//! Every built-in validator starts with [`base_validate`](types::base_validate):
//! absent data takes the schema default, and absent required data is an
//! error.
//!
//! ## Crate Policy
//!
//! - Depends only on `dschema-core` internally.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Data problems are reported as diagnostics, never as `Err`.

pub mod context;
pub mod master;
pub mod options;
pub mod types;

pub use context::ValidationContext;
pub use master::{DataValidator, ValidatorFactory, ValidatorMaster};
pub use options::{ValidatorOptions, DEFAULT_MAX_REF_DEPTH};
