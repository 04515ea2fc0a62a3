//! Tolerant decoders for backend progress data.
//!
//! Progress is advisory: a malformed counter must not make a whole snapshot unreadable.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

/// Any JSON number or numeric string; `None` for everything else.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Non-negative whole count. Negative, fractional or junk input is coerced; junk becomes 0.
fn to_count(value: &Value) -> u64 {
    if let Value::Number(n) = value
        && let Some(exact) = n.as_u64()
    {
        return exact;
    }
    match number(value) {
        Some(f) if f.is_finite() && f > 0.0 => f.round() as u64,
        _ => 0,
    }
}

pub(crate) fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(to_count(&Value::deserialize(d)?))
}

pub(crate) fn opt_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        v => Some(to_count(&v)),
    })
}

pub(crate) fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(number(&Value::deserialize(d)?))
}

/// Decode `T` if possible, else `None`.
pub(crate) fn or_none<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(d)?.and_then(|v| serde_json::from_value(v).ok()))
}

/// Message lines; non-string entries are dropped, a lone string becomes one line.
pub(crate) fn lines<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) => vec![s],
        _ => Vec::new(),
    })
}
