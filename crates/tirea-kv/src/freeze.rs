//! Freezing: marking containers immutable against in-place mutation.

use crate::Value;

/// Freeze a container (shallow) and return another handle to it.
///
/// Non-container values are returned as they are; they are already immutable.
pub fn freeze(value: &Value) -> Value {
    match value {
        Value::Indexed(items) => items.freeze(),
        Value::Keyed(entries) => entries.freeze(),
        _ => {}
    }
    value.clone()
}

/// Freeze every container reachable from `value`, children first.
pub fn deep_freeze(value: &Value) -> Value {
    match value {
        Value::Indexed(items) => items.iter().for_each(|item| {
            deep_freeze(item);
        }),
        Value::Keyed(entries) => entries.iter().for_each(|(_, item)| {
            deep_freeze(item);
        }),
        _ => {}
    }
    freeze(value)
}

/// Shallow frozen state.
#[inline]
pub fn is_frozen(value: &Value) -> bool {
    value.is_frozen()
}

/// Whether `value` and everything reachable from it is frozen.
pub fn is_deep_frozen(value: &Value) -> bool {
    if !value.is_frozen() {
        return false;
    }
    match value {
        Value::Indexed(items) => items.iter().all(is_deep_frozen),
        Value::Keyed(entries) => entries.iter().all(|(_, item)| is_deep_frozen(item)),
        _ => true,
    }
}

/// Wrap a factory so everything it builds comes back frozen.
///
/// ```
/// use tirea_kv::freeze::immutable;
/// use tirea_kv::Value;
///
/// let vec2d = immutable(|(x, y): (i64, i64)| {
///     Value::keyed([("x", Value::from(x)), ("y", Value::from(y))])
/// });
/// assert!(vec2d((1, 2)).is_frozen());
/// ```
pub fn immutable<T, F>(factory: F) -> impl Fn(T) -> Value
where
    F: Fn(T) -> Value,
{
    move |props| freeze(&factory(props))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_freeze_is_shallow() {
        let v = Value::from(json!({"a": {"b": 1}}));
        let frozen = freeze(&v);
        assert!(frozen.same(&v));
        assert!(is_frozen(&v));
        assert!(!is_frozen(&v["a"]));
        assert!(!is_deep_frozen(&v));
    }

    #[test]
    fn test_deep_freeze() {
        let v = Value::from(json!({"a": {"b": [1, {"c": 2}]}}));
        deep_freeze(&v);
        assert!(is_deep_frozen(&v));
        assert!(is_frozen(&v["a"]["b"][1]));
    }

    #[test]
    fn test_primitives_are_frozen() {
        assert!(is_frozen(&Value::from(1)));
        assert!(is_deep_frozen(&Value::Null));
        assert!(freeze(&Value::from("x")).same(&Value::from("x")));
    }
}
