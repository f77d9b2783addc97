use serde_json::{Map, Value};

use crate::foundation::error::{VecfieldError, VecfieldResult};

/// Module parameters: a JSON object, keyed by parameter name.
pub type AnimationProps = Map<String, Value>;

/// Build props from a `serde_json::json!({...})` object literal.
///
/// Non-object values produce empty props.
pub fn props_from_value(v: Value) -> AnimationProps {
    match v {
        Value::Object(m) => m,
        _ => AnimationProps::new(),
    }
}

/// Overlay `overrides` on top of `defaults` (shallow, key by key).
pub fn merge_props(defaults: &AnimationProps, overrides: &AnimationProps) -> AnimationProps {
    let mut out = defaults.clone();
    for (k, v) in overrides {
        out.insert(k.clone(), v.clone());
    }
    out
}

pub fn prop_f64(props: &AnimationProps, key: &str) -> Option<f64> {
    props.get(key).and_then(Value::as_f64)
}

pub fn prop_f64_or(props: &AnimationProps, key: &str, default: f64) -> f64 {
    prop_f64(props, key).unwrap_or(default)
}

/// Integral JSON numbers, including floats such as `12.0`.
pub fn prop_u64_or(props: &AnimationProps, key: &str, default: u64) -> u64 {
    let Some(raw) = props.get(key) else {
        return default;
    };
    raw.as_u64()
        .or_else(|| {
            raw.as_f64()
                .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= u64::MAX as f64)
                .map(|v| v as u64)
        })
        .unwrap_or(default)
}

/// Require `key` to be a finite number inside `[min, max]`.
pub fn require_number(props: &AnimationProps, key: &str, min: f64, max: f64) -> VecfieldResult<f64> {
    let Some(raw) = props.get(key) else {
        return Err(VecfieldError::validation(format!("missing prop \"{key}\"")));
    };
    let Some(v) = raw.as_f64() else {
        return Err(VecfieldError::validation(format!(
            "prop \"{key}\" must be a number, got {raw}"
        )));
    };
    if !v.is_finite() || v < min || v > max {
        return Err(VecfieldError::validation(format!(
            "prop \"{key}\" = {v} outside [{min}, {max}]"
        )));
    }
    Ok(v)
}

/// [`require_number`] that also rejects fractional values.
pub fn require_integer(props: &AnimationProps, key: &str, min: u64, max: u64) -> VecfieldResult<u64> {
    let v = require_number(props, key, min as f64, max as f64)?;
    if v.fract() != 0.0 {
        return Err(VecfieldError::validation(format!(
            "prop \"{key}\" = {v} must be a whole number"
        )));
    }
    Ok(v as u64)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/props.rs"]
mod tests;
