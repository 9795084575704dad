//! Reverse lookup: find every selector path leading to a given value

use serde_json::Value;

/// All dotted paths at which `tree` holds a scalar equal to `target`, in document order.
///
/// Sequence positions decorate the key holding the sequence (`Offer[1].price`)
/// rather than adding a segment of their own.
pub fn locate(tree: &Value, target: &Value) -> Vec<String> {
    let mut found = Vec::new();
    let mut path = Vec::new();
    walk(tree, target, &mut path, &mut found);
    found
}

fn walk(data: &Value, target: &Value, path: &mut Vec<String>, found: &mut Vec<String>) {
    match data {
        Value::Object(map) => {
            // Keys holding selector syntax cannot be written as a segment
            for (key, value) in map.iter().filter(|(key, _)| is_plain_key(key)) {
                path.push(key.clone());
                walk(value, target, path, found);
                path.pop();
            }
        }
        Value::Array(items) => {
            // Only a plain key can take an index; anything else is reached by broadcast
            let decorate = path.last().is_some_and(|last| !last.ends_with(']'));
            for (ix, item) in items.iter().enumerate() {
                if decorate {
                    let plain = path.pop().unwrap_or_default();
                    path.push(format!("{}[{}]", plain, ix));
                    walk(item, target, path, found);
                    path.pop();
                    path.push(plain);
                } else {
                    walk(item, target, path, found);
                }
            }
        }
        scalar => {
            if !path.is_empty() && scalar_eq(scalar, target) {
                found.push(path.join("."));
            }
        }
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['.', '[', ']'])
}

/// Scalar equality where `1` and `1.0` are the same number
fn scalar_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}
