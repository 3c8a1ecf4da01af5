//! `combine` validator.
//!
//! Each declared group is evaluated on its own:
//!
//! - `allOf` feeds every member the previous member's output and stops at
//!   the first failure;
//! - `anyOf` stops at the first member that passes;
//! - `oneOf` tries every member and passes only when exactly one does.
//!
//! The group outcomes are then joined by the schema's strategy. Diagnostics
//! of failing members are only reported when their group fails.

use dschema_core::schema::types;
use dschema_core::{CombineSchema, CombineStrategy, Diagnostic, Schema, SchemaKind, ValidationResult};
use serde_json::Value;

use super::base::{base_validate, kind_mismatch};
use crate::context::ValidationContext;
use crate::master::{DataValidator, ValidatorFactory};

struct GroupOutcome {
    diagnostics: ValidationResult,
    value: Option<Value>,
    valid: bool,
}

fn members(group: &Option<Vec<Schema>>) -> Option<&[Schema]> {
    group.as_deref().filter(|members| !members.is_empty())
}

fn all_of(members: &[Schema], data: &Value, ctx: &mut ValidationContext<'_>) -> GroupOutcome {
    let mut diagnostics = ValidationResult::new();
    let mut current = data.clone();
    let mut valid = true;
    for (i, member) in members.iter().enumerate() {
        let member_result = ctx.validate_data_schema(member, Some(&current));
        diagnostics.add_handle_result("allOf", &member_result, Some(i.to_string().as_str()));
        if member_result.has_error() {
            valid = false;
            break;
        }
        if let Some(value) = member_result.into_value() {
            current = value;
        }
    }
    if !valid {
        diagnostics.add_error(Diagnostic::new(
            "allOf",
            "not matched all of the schemas defined in allOf.",
        ));
    }
    GroupOutcome {
        diagnostics,
        value: valid.then_some(current),
        valid,
    }
}

fn any_of(members: &[Schema], data: &Value, ctx: &mut ValidationContext<'_>) -> GroupOutcome {
    let mut failures = Vec::new();
    for (i, member) in members.iter().enumerate() {
        let member_result = ctx.validate_data_schema(member, Some(data));
        if member_result.has_error() {
            failures.push((i, member_result));
            continue;
        }
        let mut diagnostics = ValidationResult::new();
        diagnostics.add_handle_result("anyOf", &member_result, Some(i.to_string().as_str()));
        return GroupOutcome {
            diagnostics,
            value: Some(member_result.into_value().unwrap_or_else(|| data.clone())),
            valid: true,
        };
    }

    let mut diagnostics = ValidationResult::new();
    for (i, failure) in &failures {
        diagnostics.add_handle_result("anyOf", failure, Some(i.to_string().as_str()));
    }
    diagnostics.add_error(Diagnostic::new(
        "anyOf",
        "not matched any of the schemas defined in anyOf.",
    ));
    GroupOutcome {
        diagnostics,
        value: None,
        valid: false,
    }
}

fn one_of(members: &[Schema], data: &Value, ctx: &mut ValidationContext<'_>) -> GroupOutcome {
    let mut diagnostics = ValidationResult::new();
    let mut failures = Vec::new();
    let mut value = None;
    let mut matched = 0usize;
    for (i, member) in members.iter().enumerate() {
        let member_result = ctx.validate_data_schema(member, Some(data));
        if member_result.has_error() {
            failures.push((i, member_result));
            continue;
        }
        matched += 1;
        diagnostics.add_handle_result("oneOf", &member_result, Some(i.to_string().as_str()));
        if value.is_none() {
            value = Some(member_result.into_value().unwrap_or_else(|| data.clone()));
        }
    }

    let valid = matched == 1;
    if !valid {
        for (i, failure) in &failures {
            diagnostics.add_handle_result("oneOf", failure, Some(i.to_string().as_str()));
        }
        diagnostics.add_error(Diagnostic::new(
            "oneOf",
            format!("expected to match exactly one of the schemas defined in oneOf, but matched {matched}."),
        ));
    }
    GroupOutcome {
        diagnostics,
        value: value.filter(|_| valid),
        valid,
    }
}

fn strategy_failure(strategy: CombineStrategy, checked: usize, passed: usize) -> Option<String> {
    match strategy {
        CombineStrategy::All if passed != checked => {
            Some("not matched all of [allOf, anyOf, oneOf].".to_string())
        }
        CombineStrategy::Any if passed == 0 => {
            Some("not matched any of [allOf, anyOf, oneOf].".to_string())
        }
        CombineStrategy::One if passed != 1 => Some(format!(
            "expected to match exactly one of [allOf, anyOf, oneOf], but matched {passed}."
        )),
        _ => None,
    }
}

fn evaluate(combine: &CombineSchema, data: &Value, ctx: &mut ValidationContext<'_>) -> Vec<GroupOutcome> {
    let mut outcomes = Vec::with_capacity(3);
    if let Some(group) = members(&combine.all_of) {
        outcomes.push(all_of(group, data, ctx));
    }
    if let Some(group) = members(&combine.any_of) {
        outcomes.push(any_of(group, data, ctx));
    }
    if let Some(group) = members(&combine.one_of) {
        outcomes.push(one_of(group, data, ctx));
    }
    outcomes
}

/// Validator of `combine` schemas.
#[derive(Debug, Clone, Copy)]
pub struct CombineValidator<'s> {
    schema: &'s Schema,
}

impl DataValidator for CombineValidator<'_> {
    fn validate(&self, data: Option<&Value>, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let SchemaKind::Combine(combine) = &self.schema.kind else {
            return kind_mismatch(types::COMBINE, self.schema);
        };
        let mut result = base_validate(self.schema, data);
        let Some(value) = result.take_value() else {
            return result;
        };

        let outcomes = evaluate(combine, &value, ctx);
        let passed = outcomes.iter().filter(|outcome| outcome.valid).count();

        if let Some(reason) = strategy_failure(combine.strategy, outcomes.len(), passed) {
            for outcome in &outcomes {
                result.merge(&outcome.diagnostics);
            }
            result.add_error(Diagnostic::new("strategy", reason));
            return result;
        }

        let mut output = None;
        for outcome in outcomes.into_iter().filter(|outcome| outcome.valid) {
            result.merge(&outcome.diagnostics);
            if output.is_none() {
                output = outcome.value;
            }
        }
        result.set_value(output.unwrap_or(value));
        result
    }
}

/// Creates [`CombineValidator`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombineValidatorFactory;

impl ValidatorFactory for CombineValidatorFactory {
    fn type_name(&self) -> &str {
        types::COMBINE
    }

    fn create<'s>(&self, schema: &'s Schema) -> Box<dyn DataValidator + 's> {
        Box::new(CombineValidator { schema })
    }
}
