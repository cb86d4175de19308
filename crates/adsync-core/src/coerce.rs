//! # Numeric Coercion
//!
//! Platform report APIs send metrics in loose JSON: Google Ads encodes
//! int64 fields as strings, TikTok encodes every metric as a string and
//! uses placeholders like `"-"` for not-applicable values.
//!
//! Coercion never fails. A value that cannot be read as the target type
//! becomes `None`, and the row is kept.

use serde_json::Value;

/// Read an integer count. Integral floats (`"12.0"`) are accepted.
pub fn to_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

/// Read a finite floating-point value.
pub fn to_float(value: Option<&Value>) -> Option<f64> {
    let f = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    f.is_finite().then_some(f)
}

/// Read a free-text or identifier field.
///
/// Numbers are rendered from their JSON text, so 64-bit IDs sent as bare
/// numbers keep every digit. Empty strings become `None`.
pub fn to_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
}
