use crate::errors::DecodeError;
use serde_json::{Number, Value};

/// Reports whether two filter config texts encode the same JSON value.
///
/// Object keys are compared regardless of order, arrays element by element.
/// Numbers compare by numeric value, so `1` and `1.0` are equal. Two integers
/// are compared exactly.
pub fn config_equivalent(a: &str, b: &str) -> Result<bool, DecodeError> {
    let a: Value = serde_json::from_str(a)?;
    let b: Value = serde_json::from_str(b)?;
    Ok(structurally_equal(&a, &b))
}

pub fn structurally_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| structurally_equal(value, other)))
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| structurally_equal(x, y))
        }
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        _ => a == b,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if a.is_f64() || b.is_f64() {
        return a.as_f64() == b.as_f64();
    }
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => a.as_u64() == b.as_u64(),
    }
}
