//! # Cover Functions
//!
//! Small coercion primitives used by compilers (to read raw schema
//! properties) and by validators (to read input data).
//!
//! Every cover function has the shape
//! `fn(default: Option<T>, raw: Option<&Value>) -> CoverResult<T>`:
//!
//! - absent or JSON `null` input yields `default` with no error;
//! - input that cannot be converted yields an error and, unless noted,
//!   falls back to `default`.
//!
//! [`cover_integer`] is deliberately asymmetric: a number that parses but is
//! not integral is flagged as an error *and* returned as parsed.

use regex::Regex;
use serde_json::Value;

use crate::json::{exact_i64, stringify};
use crate::schema::Pattern;

/// Value-or-default plus the errors met while converting.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverResult<T> {
    /// Converted value, or the default.
    pub value: Option<T>,
    /// Conversion errors.
    pub errors: Vec<String>,
}

impl<T> CoverResult<T> {
    fn ok(value: Option<T>) -> Self {
        Self {
            value,
            errors: Vec::new(),
        }
    }

    fn fail(default: Option<T>, error: String) -> Self {
        Self {
            value: default,
            errors: vec![error],
        }
    }

    /// Whether conversion reported at least one error.
    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    /// All errors joined by newlines.
    pub fn error_summary(&self) -> String {
        self.errors.join("\n")
    }
}

/// Booleans, or the strings `"true"`/`"false"` in any case.
pub fn cover_boolean(default: Option<bool>, raw: Option<&Value>) -> CoverResult<bool> {
    match raw {
        None | Some(Value::Null) => CoverResult::ok(default),
        Some(Value::Bool(b)) => CoverResult::ok(Some(*b)),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => CoverResult::ok(Some(true)),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => CoverResult::ok(Some(false)),
        Some(other) => CoverResult::fail(
            default,
            format!("({}) is not a valid boolean (or boolean string)", stringify(Some(other))),
        ),
    }
}

fn parse_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Numbers, or strings holding a finite number.
pub fn cover_number(default: Option<f64>, raw: Option<&Value>) -> CoverResult<f64> {
    match raw {
        None | Some(Value::Null) => CoverResult::ok(default),
        Some(v) => match parse_number(v) {
            Some(n) => CoverResult::ok(Some(n)),
            None => CoverResult::fail(
                default,
                format!("({}) is not a valid number (or number string)", stringify(Some(v))),
            ),
        },
    }
}

/// Like [`cover_number`]; a non-integral number is reported but still returned.
pub fn cover_integer(default: Option<f64>, raw: Option<&Value>) -> CoverResult<f64> {
    let mut result = cover_number(default, raw);
    if result.has_error() {
        return result;
    }
    if let (Some(n), Some(v)) = (result.value, raw) {
        if n.fract() != 0.0 {
            result.errors.push(format!(
                "({}) is not a valid integer (or integer string)",
                stringify(Some(v))
            ));
        }
    }
    result
}

/// Integers as exact `i64` values.
///
/// JSON integers and integer strings are read without going through `f64`,
/// so values beyond 2^53 keep every digit. Other numbers go through
/// [`cover_integer`]; a fraction or a value outside the `i64` range is an
/// error and yields `default`.
pub fn cover_i64(default: Option<i64>, raw: Option<&Value>) -> CoverResult<i64> {
    let v = match raw {
        None | Some(Value::Null) => return CoverResult::ok(default),
        Some(v) => v,
    };
    if let Some(n) = v.as_i64() {
        return CoverResult::ok(Some(n));
    }
    if let Some(n) = v.as_str().and_then(|s| s.trim().parse::<i64>().ok()) {
        return CoverResult::ok(Some(n));
    }
    let covered = cover_integer(None, Some(v));
    if covered.has_error() {
        return CoverResult {
            value: default,
            errors: covered.errors,
        };
    }
    match covered.value.and_then(exact_i64) {
        Some(n) => CoverResult::ok(Some(n)),
        None => CoverResult::fail(
            default,
            format!("({}) is outside the integer range", stringify(Some(v))),
        ),
    }
}

/// Strings only.
pub fn cover_string(default: Option<String>, raw: Option<&Value>) -> CoverResult<String> {
    match raw {
        None | Some(Value::Null) => CoverResult::ok(default),
        Some(Value::String(s)) => CoverResult::ok(Some(s.clone())),
        Some(other) => CoverResult::fail(
            default,
            format!("({}) is not a valid string", stringify(Some(other))),
        ),
    }
}

/// A string compiled as a regular expression.
pub fn cover_regex(default: Option<Pattern>, raw: Option<&Value>) -> CoverResult<Pattern> {
    match raw {
        None | Some(Value::Null) => CoverResult::ok(default),
        Some(Value::String(s)) => match Regex::new(s) {
            Ok(regex) => CoverResult::ok(Some(Pattern::from(regex))),
            Err(e) => CoverResult::fail(default, format!("({s}) is not a valid regex: {e}")),
        },
        Some(other) => CoverResult::fail(
            default,
            format!("({}) is not a valid regex string", stringify(Some(other))),
        ),
    }
}

/// Only an explicit JSON `null` is a null value; anything else is an error.
pub fn cover_null(default: Option<Value>, raw: Option<&Value>) -> CoverResult<Value> {
    match raw {
        None => CoverResult::ok(default),
        Some(Value::Null) => CoverResult::ok(Some(Value::Null)),
        Some(other) => CoverResult::fail(
            default,
            format!("({}) is not null", stringify(Some(other))),
        ),
    }
}

/// Lift an element cover function to arrays.
///
/// Elements that fail to convert are skipped; each failure is recorded as
/// `index(i): <errors>`. The value is the array of elements that converted.
pub fn cover_array<T, F>(elem: F) -> impl Fn(Option<Vec<T>>, Option<&Value>) -> CoverResult<Vec<T>>
where
    F: Fn(Option<T>, Option<&Value>) -> CoverResult<T>,
{
    move |default, raw| {
        let items = match raw {
            None | Some(Value::Null) => return CoverResult::ok(default),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return CoverResult::fail(
                    default,
                    format!("({}) is not a valid array", stringify(Some(other))),
                )
            }
        };

        let mut result = CoverResult::ok(None);
        let mut resolved = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let x = elem(None, Some(item));
            if x.has_error() {
                result
                    .errors
                    .push(format!("index({i}): {}", x.error_summary()));
                continue;
            }
            if let Some(v) = x.value {
                resolved.push(v);
            }
        }
        result.value = Some(resolved);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_yields_default() {
        assert_eq!(cover_boolean(Some(true), None).value, Some(true));
        assert_eq!(cover_number(Some(1.5), Some(&Value::Null)).value, Some(1.5));
        assert_eq!(cover_string(None, None).value, None);
        assert!(!cover_string(None, None).has_error());
    }

    #[test]
    fn test_cover_boolean_strings() {
        assert_eq!(cover_boolean(None, Some(&json!("TRUE"))).value, Some(true));
        assert_eq!(cover_boolean(None, Some(&json!("False"))).value, Some(false));
        let bad = cover_boolean(Some(false), Some(&json!("yes")));
        assert!(bad.has_error());
        assert_eq!(bad.value, Some(false));
        assert!(cover_boolean(None, Some(&json!(1))).has_error());
    }

    #[test]
    fn test_cover_number_strings() {
        assert_eq!(cover_number(None, Some(&json!("12.5"))).value, Some(12.5));
        assert_eq!(cover_number(None, Some(&json!(" 7 "))).value, Some(7.0));
        let bad = cover_number(Some(0.0), Some(&json!("abc")));
        assert!(bad.has_error());
        assert_eq!(bad.value, Some(0.0));
        assert!(cover_number(None, Some(&json!(""))).has_error());
        assert!(cover_number(None, Some(&json!(true))).has_error());
    }

    #[test]
    fn test_cover_integer_flags_but_keeps_fraction() {
        let r = cover_integer(None, Some(&json!(2.5)));
        assert!(r.has_error());
        assert_eq!(r.value, Some(2.5));

        let r = cover_integer(None, Some(&json!("42")));
        assert!(!r.has_error());
        assert_eq!(r.value, Some(42.0));

        let r = cover_integer(Some(1.0), Some(&json!("x")));
        assert!(r.has_error());
        assert_eq!(r.value, Some(1.0));
    }

    #[test]
    fn test_cover_i64_keeps_large_integers_exact() {
        let r = cover_i64(None, Some(&json!(9_007_199_254_740_993_i64)));
        assert_eq!(r.value, Some(9_007_199_254_740_993));
        let r = cover_i64(None, Some(&json!("9007199254740993")));
        assert_eq!(r.value, Some(9_007_199_254_740_993));
        assert_eq!(cover_i64(None, Some(&json!(4.0))).value, Some(4));
    }

    #[test]
    fn test_cover_i64_rejects_fraction_and_overflow() {
        let r = cover_i64(Some(0), Some(&json!(2.5)));
        assert!(r.has_error());
        assert_eq!(r.value, Some(0));

        let r = cover_i64(None, Some(&json!(u64::MAX)));
        assert!(r.has_error());
        assert!(r.errors[0].contains("outside the integer range"));
        assert!(cover_i64(None, Some(&json!(1e300))).has_error());
    }

    #[test]
    fn test_cover_regex_reports_construction_error() {
        let r = cover_regex(None, Some(&json!("^[a-z]+$")));
        assert!(!r.has_error());
        assert!(r.value.unwrap().is_match("abc"));

        let r = cover_regex(None, Some(&json!("(unclosed")));
        assert!(r.has_error());
        assert!(r.value.is_none());
    }

    #[test]
    fn test_cover_null() {
        assert_eq!(cover_null(None, Some(&Value::Null)).value, Some(Value::Null));
        assert!(cover_null(None, Some(&json!(0))).has_error());
        assert_eq!(cover_null(None, None).value, None);
    }

    #[test]
    fn test_cover_array_skips_bad_elements() {
        let cover = cover_array(cover_string);
        let r = cover(None, Some(&json!(["a", 1, "b"])));
        assert_eq!(r.value, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(r.errors.len(), 1);
        assert!(r.errors[0].starts_with("index(1): "));
    }

    #[test]
    fn test_cover_array_rejects_non_array() {
        let cover = cover_array(cover_number);
        let r = cover(Some(vec![1.0]), Some(&json!("1,2")));
        assert!(r.has_error());
        assert_eq!(r.value, Some(vec![1.0]));
    }
}
