//! # Cover and Result Property Tests
//!
//! Property checks over the cover primitives and the result accumulator:
//!
//! 1. An absent input always yields the supplied default without errors.
//! 2. A cover function that reports an error never invents a value other
//!    than the default (except `cover_integer`, which keeps the parsed value).
//! 3. A `HandleResult` with errors never exposes a value.

use dschema_core::cover::{cover_array, cover_boolean, cover_integer, cover_number, cover_string};
use dschema_core::{Diagnostic, HandleResult};
use proptest::prelude::*;
use serde_json::{json, Value};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 .]{0,12}".prop_map(Value::String),
    ]
}

proptest! {
    #[test]
    fn absent_input_yields_default(default in any::<i32>()) {
        let n = f64::from(default);
        let r = cover_number(Some(n), None);
        prop_assert_eq!(r.value, Some(n));
        prop_assert!(!r.has_error());

        let r = cover_string(Some(default.to_string()), Some(&Value::Null));
        prop_assert!(!r.has_error());
        prop_assert_eq!(r.value, Some(default.to_string()));
    }

    #[test]
    fn failed_cover_falls_back_to_default(raw in scalar(), default in any::<bool>()) {
        let r = cover_boolean(Some(default), Some(&raw));
        if r.has_error() {
            prop_assert_eq!(r.value, Some(default));
        }
        let r = cover_string(None, Some(&raw));
        if r.has_error() {
            prop_assert!(r.value.is_none());
        }
    }

    #[test]
    fn integers_round_trip_through_strings(n in any::<i32>()) {
        let r = cover_integer(None, Some(&json!(n.to_string())));
        prop_assert!(!r.has_error());
        prop_assert_eq!(r.value, Some(f64::from(n)));
    }

    #[test]
    fn cover_array_reports_one_error_per_bad_element(items in prop::collection::vec(scalar(), 0..10)) {
        let cover = cover_array(cover_string);
        let r = cover(None, Some(&Value::Array(items.clone())));
        let strings = items.iter().filter(|v| v.is_string()).count();
        let bad = items.iter().filter(|v| !v.is_string() && !v.is_null()).count();
        prop_assert_eq!(r.value.map(|v| v.len()), Some(strings));
        prop_assert_eq!(r.errors.len(), bad);
    }

    #[test]
    fn errors_hide_value(value in any::<i64>(), errors in 0usize..4) {
        let mut result: HandleResult<i64> = HandleResult::new();
        result.set_value(value);
        for i in 0..errors {
            result.add_error(Diagnostic::new("type", format!("error {i}")));
        }
        prop_assert_eq!(result.has_error(), result.value().is_none());
    }
}

#[test]
fn test_nested_results_flatten_to_paths() {
    let mut leaf: HandleResult<Value> = HandleResult::new();
    leaf.add_error(Diagnostic::new("required", "required, but got (undefined)."));

    let mut item: HandleResult<Value> = HandleResult::new();
    item.add_handle_result("properties", &leaf, Some("name"));

    let mut items: HandleResult<Value> = HandleResult::new();
    items.add_handle_result("items", &item, Some("0"));

    let mut root: HandleResult<Value> = HandleResult::new();
    root.add_handle_result("properties", &items, Some("children"));

    let flat = root.flatten_errors();
    assert_eq!(flat.len(), 1);
    assert_eq!(flat[0].property.as_deref(), Some("children.0.name"));
    assert_eq!(flat[0].constraint, "required");
}
