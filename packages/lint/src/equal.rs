//! Structural equality for decoded JSON values
//!
//! Recursive comparison used by duplicate-response detection. Differs from
//! `serde_json::Value`'s own `PartialEq` in one respect: numbers compare by
//! numeric value, so `1` and `1.0` are equal (decoded responses carry no
//! integer/float distinction worth reporting on).

use serde_json::Value;

/// Compare two decoded values structurally.
///
/// Primitives compare by value; objects are equal iff they have the same key
/// set (order-independent) and recursively equal values; arrays compare by
/// index and must have equal length.
#[must_use]
pub fn structural_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => {
            x == y || x.as_f64() == y.as_f64()
        }
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len()
                && x.iter().zip(y).all(|(xv, yv)| structural_eq(xv, yv))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(key, xv)| {
                    y.get(key).is_some_and(|yv| structural_eq(xv, yv))
                })
        }
        _ => false,
    }
}
