//! Loose integer conversion of transport values.
//!
//! Remote callers send identifiers as numbers or strings interchangeably.
//! Integer-like prefixes are honoured; anything unusable becomes `0`, which
//! never names a stored row.

use serde_json::Value;

/// Converts a transport value to an integer the way a loose cast would.
#[must_use]
pub fn integer_cast(value: &Value) -> i64 {
    match value {
        Value::Bool(flag) => i64::from(*flag),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64))
            .unwrap_or(0),
        Value::String(text) => leading_integer(text),
        Value::Null | Value::Array(_) | Value::Object(_) => 0,
    }
}

/// Parses the leading `[+-]digits` prefix, ignoring leading whitespace.
fn leading_integer(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|character: char| !character.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end]
        .parse::<i64>()
        .map(|value| sign * value)
        .unwrap_or(0)
}
