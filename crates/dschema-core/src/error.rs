//! # Error Types
//!
//! Rust-level failures of the dschema crates. All errors use `thiserror`.
//!
//! ## Design
//!
//! - Problems found in a raw schema or in validated data are *not* errors
//!   in this sense. They are recorded as [`Diagnostic`](crate::Diagnostic)s
//!   inside a [`HandleResult`](crate::HandleResult) and returned to the caller.
//! - The types here cover programmer-facing failures: a serialized schema
//!   that cannot be read back, or a definition registered twice.

use thiserror::Error;

/// Top-level error type for dschema.
#[derive(Error, Debug)]
pub enum DschemaError {
    /// A serialized schema could not be parsed back into a [`Schema`](crate::Schema).
    #[error("schema json error: {0}")]
    SchemaJson(#[from] SchemaJsonError),

    /// A definition could not be registered.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error while reading a schema back from its JSON form.
#[derive(Error, Debug)]
pub enum SchemaJsonError {
    /// The JSON value is not an object.
    #[error("expected a schema object, got {0}")]
    NotAnObject(String),

    /// The `type` discriminator is missing or not a string.
    #[error("missing or invalid `type` field")]
    MissingType,

    /// No compiler is registered for the `type` discriminator.
    #[error("unknown schema type: {0}")]
    UnknownType(String),

    /// A field has the wrong shape for its schema type.
    #[error("invalid field `{field}` for schema type `{type_name}`: {reason}")]
    InvalidField {
        /// Schema type being parsed.
        type_name: String,
        /// Offending field name.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A `pattern` could not be compiled as a regular expression.
    #[error("invalid pattern `{source_text}`: {reason}")]
    InvalidPattern {
        /// Pattern source text.
        source_text: String,
        /// Reason reported by the regex engine.
        reason: String,
    },
}

/// Error raised by the definition registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Another definition already uses this `$id`.
    #[error("$id({0}) has existed")]
    DuplicateId(String),

    /// Another definition already occupies this path.
    #[error("$path({0}) has existed")]
    DuplicatePath(String),

    /// No definition is registered under this id or path.
    #[error("no definition registered under ({0})")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::DuplicateId("#/node".to_string());
        assert_eq!(err.to_string(), "$id(#/node) has existed");
        let err = RegistryError::DuplicatePath("#/definitions/a".to_string());
        assert!(err.to_string().contains("#/definitions/a"));
    }

    #[test]
    fn test_schema_json_error_wraps_into_top_level() {
        let err: DschemaError = SchemaJsonError::UnknownType("ipv4".to_string()).into();
        assert!(err.to_string().contains("unknown schema type: ipv4"));
    }
}
