//! Tolerant decoders for upstream numeric fields.
//!
//! Grants.gov returns amounts as numbers, numeric strings, empty strings or
//! `"none"` depending on the record; anything that is not a usable number
//! decodes to `None` instead of failing the whole payload.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(value_as_f64))
}

pub(crate) fn i64_opt<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(|v| match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().replace(',', "").parse::<i64>().ok(),
        _ => None,
    }))
}

fn value_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_start_matches('$')
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite()),
        _ => None,
    }
}
