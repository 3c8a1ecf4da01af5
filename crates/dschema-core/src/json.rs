//! JSON value helpers shared by compilers and validators.

use serde_json::Value;

/// Render a value the way diagnostics quote it: strings bare, containers
/// as compact JSON, and absent values as `undefined`.
pub fn stringify(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Whether a value counts as "not set": missing entirely or JSON `null`.
pub fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Drop JSON `null` so that callers only see present values.
pub fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Human-readable name of a JSON value's type.
pub fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `"an"` before a vowel-initial type name, `"a"` otherwise.
pub fn indefinite_article(word: &str) -> &'static str {
    match word.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

/// `n` as an `i64`, if it is integral and inside the `i64` range.
///
/// `i64::MAX as f64` rounds up to 2^63, which is itself out of range, so the
/// upper bound is exclusive.
pub fn exact_i64(n: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (n.fract() == 0.0 && n >= -LIMIT && n < LIMIT).then_some(n as i64)
}

/// Build a JSON number from an `f64`, preferring an integer representation
/// when the value is integral and fits in `i64`.
pub fn number_value(n: f64) -> Value {
    if let Some(i) = exact_i64(n) {
        Value::from(i)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
