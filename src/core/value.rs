use crate::storage::ID_FIELD;
use serde_json::Value;

/// Identity-aware equality for document field values.
///
/// Sub-document collapsing compares values that may be opaque identity
/// handles (objects carrying the reserved identity field) or plain
/// primitives. Rules, in order:
///
/// - two objects that both carry the identity field compare by that field's
///   value alone,
/// - two numbers compare numerically, so `4` equals `4.0`,
/// - everything else falls back to structural equality.
///
/// Incomparable shapes yield `false`; this function never fails.
pub fn identity_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(left), Value::Object(right)) => {
            match (left.get(ID_FIELD), right.get(ID_FIELD)) {
                (Some(left_id), Some(right_id)) => left_id == right_id,
                _ => a == b,
            }
        }
        (Value::Number(left), Value::Number(right)) => {
            if let (Some(x), Some(y)) = (left.as_i64(), right.as_i64()) {
                return x == y;
            }
            match (left.as_f64(), right.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        _ => a == b,
    }
}

/// Numeric addition over JSON values.
///
/// Integer addition is preserved while both operands are integers; any
/// float operand promotes the result to a float. Returns `None` when either
/// operand is not a number, including integer overflow that cannot be
/// represented.
pub fn numeric_add(a: &Value, b: &Value) -> Option<Value> {
    let (left, right) = match (a, b) {
        (Value::Number(x), Value::Number(y)) => (x, y),
        _ => return None,
    };

    if let (Some(x), Some(y)) = (left.as_i64(), right.as_i64()) {
        if let Some(sum) = x.checked_add(y) {
            return Some(Value::from(sum));
        }
    }

    match (left.as_f64(), right.as_f64()) {
        (Some(x), Some(y)) => serde_json::Number::from_f64(x + y).map(Value::Number),
        _ => None,
    }
}
