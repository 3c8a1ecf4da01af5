//! # Diagnostics and Result Accumulation
//!
//! Every compile and validate call returns a [`HandleResult`]: an optional
//! value plus ordered error and warning lists. Nothing is thrown across the
//! public API; callers check [`HandleResult::has_error`] before using the
//! value.
//!
//! ## Invariant
//!
//! A result that carries at least one error never exposes a value.
//! [`HandleResult::value`] and [`HandleResult::into_value`] return `None`
//! whenever `errors` is non-empty, so a handler that sets a value and then
//! records an error cannot leak a half-built value.
//!
//! ## Property paths
//!
//! Nested results are attached with [`HandleResult::add_handle_result`],
//! which wraps the child's diagnostics in one parent diagnostic tagged with
//! the child's path segment (an object key or an array index). The nested
//! chain can later be flattened into dotted paths such as
//! `children.1.children.0.name` with [`HandleResult::flatten_errors`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single error or warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Name of the violated constraint (`type`, `required`, `minimum`, ...).
    pub constraint: String,
    /// Path segment of the node this diagnostic was raised for, relative to
    /// the node owning the enclosing result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Human-readable description.
    pub reason: String,
    /// Nested causes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traces: Vec<Diagnostic>,
}

impl Diagnostic {
    /// Create a diagnostic without a property or traces.
    pub fn new(constraint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
            property: None,
            reason: reason.into(),
            traces: Vec::new(),
        }
    }

    /// Attach a property path segment.
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Attach nested causes.
    pub fn with_traces(mut self, traces: Vec<Diagnostic>) -> Self {
        self.traces = traces;
        self
    }

    fn flatten_into(&self, prefix: Option<&str>, out: &mut Vec<FlatDiagnostic>) {
        let path = match (prefix, self.property.as_deref()) {
            (Some(p), Some(q)) if !q.is_empty() => Some(format!("{p}.{q}")),
            (Some(p), _) => Some(p.to_string()),
            (None, Some(q)) if !q.is_empty() => Some(q.to_string()),
            (None, _) => None,
        };
        if self.traces.is_empty() {
            out.push(FlatDiagnostic {
                constraint: self.constraint.clone(),
                property: path,
                reason: self.reason.clone(),
            });
            return;
        }
        for trace in &self.traces {
            trace.flatten_into(path.as_deref(), out);
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            Some(p) => write!(f, "{}({}): {}", self.constraint, p, self.reason),
            None => write!(f, "{}: {}", self.constraint, self.reason),
        }
    }
}

/// A leaf diagnostic with its full dotted property path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatDiagnostic {
    /// Constraint of the leaf diagnostic.
    pub constraint: String,
    /// Dotted path from the root node, if any segment was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Reason of the leaf diagnostic.
    pub reason: String,
}

impl fmt::Display for FlatDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            Some(p) => write!(f, "  {p}: [{}] {}", self.constraint, self.reason),
            None => write!(f, "  (root): [{}] {}", self.constraint, self.reason),
        }
    }
}

/// Accumulator of a computed value plus diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleResult<T> {
    value: Option<T>,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

/// Result of compiling a raw schema.
pub type CompileResult<T> = HandleResult<T>;

/// Result of validating data against a schema.
pub type ValidationResult = HandleResult<Value>;

impl<T> Default for HandleResult<T> {
    fn default() -> Self {
        Self {
            value: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<T> HandleResult<T> {
    /// An empty result: no value, no diagnostics.
    pub fn new() -> Self {
        Self::default()
    }

    /// The computed value, hidden while any error is present.
    pub fn value(&self) -> Option<&T> {
        if self.has_error() {
            None
        } else {
            self.value.as_ref()
        }
    }

    /// Consume the result and return its value, `None` if any error is present.
    pub fn into_value(self) -> Option<T> {
        if self.has_error() {
            None
        } else {
            self.value
        }
    }

    /// Set (or replace) the value.
    pub fn set_value(&mut self, value: T) -> &mut Self {
        self.value = Some(value);
        self
    }

    /// Drop the value, keeping diagnostics.
    pub fn clear_value(&mut self) -> &mut Self {
        self.value = None;
        self
    }

    /// Take the value out of the result, regardless of errors.
    ///
    /// Used by handlers that run a base step, then continue refining the
    /// value themselves.
    pub fn take_value(&mut self) -> Option<T> {
        self.value.take()
    }

    /// Error diagnostics, in the order they were recorded.
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Warning diagnostics, in the order they were recorded.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Whether at least one error was recorded.
    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether at least one warning was recorded.
    pub fn has_warning(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Append an error.
    pub fn add_error(&mut self, error: Diagnostic) -> &mut Self {
        self.errors.push(error);
        self
    }

    /// Append a warning.
    pub fn add_warning(&mut self, warning: Diagnostic) -> &mut Self {
        self.warnings.push(warning);
        self
    }

    /// Append another result's errors and warnings, unwrapped.
    pub fn merge<U>(&mut self, other: &HandleResult<U>) -> &mut Self {
        self.errors.extend(other.errors.iter().cloned());
        self.warnings.extend(other.warnings.iter().cloned());
        self
    }

    /// Attach a nested result under `constraint`.
    ///
    /// If `sub` has errors, one parent error is added whose reason is the
    /// roll-up of the child errors and whose traces are the child errors.
    /// Warnings are handled the same way.
    pub fn add_handle_result<U>(
        &mut self,
        constraint: &str,
        sub: &HandleResult<U>,
        property: Option<&str>,
    ) -> &mut Self {
        self.add_handle_result_with_reason(constraint, sub, property, None)
    }

    /// [`add_handle_result`](Self::add_handle_result) with an explicit reason.
    pub fn add_handle_result_with_reason<U>(
        &mut self,
        constraint: &str,
        sub: &HandleResult<U>,
        property: Option<&str>,
        reason: Option<&str>,
    ) -> &mut Self {
        if sub.has_error() {
            let reason = reason.map_or_else(|| sub.error_summary(), str::to_string);
            self.errors.push(wrap(constraint, property, reason, &sub.errors));
        }
        if sub.has_warning() {
            let reason = reason.map_or_else(|| sub.warning_summary(), str::to_string);
            self.warnings.push(wrap(constraint, property, reason, &sub.warnings));
        }
        self
    }

    /// `[constraint: reason,\n...]` over all errors.
    pub fn error_summary(&self) -> String {
        summarize(&self.errors)
    }

    /// `[constraint: reason,\n...]` over all warnings.
    pub fn warning_summary(&self) -> String {
        summarize(&self.warnings)
    }

    /// Leaf errors with dotted property paths.
    pub fn flatten_errors(&self) -> Vec<FlatDiagnostic> {
        flatten(&self.errors)
    }

    /// Leaf warnings with dotted property paths.
    pub fn flatten_warnings(&self) -> Vec<FlatDiagnostic> {
        flatten(&self.warnings)
    }

    /// Map the value while keeping all diagnostics.
    pub fn map_value<U>(self, f: impl FnOnce(T) -> U) -> HandleResult<U> {
        HandleResult {
            value: self.value.map(f),
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}

fn wrap(constraint: &str, property: Option<&str>, reason: String, traces: &[Diagnostic]) -> Diagnostic {
    Diagnostic {
        constraint: constraint.to_string(),
        property: property.map(str::to_string),
        reason,
        traces: traces.to_vec(),
    }
}

fn summarize(items: &[Diagnostic]) -> String {
    let parts: Vec<String> = items
        .iter()
        .map(|d| format!("{}: {}", d.constraint, d.reason))
        .collect();
    format!("[{}]", parts.join(",\n"))
}

fn flatten(items: &[Diagnostic]) -> Vec<FlatDiagnostic> {
    let mut out = Vec::new();
    for item in items {
        item.flatten_into(None, &mut out);
    }
    out
}
