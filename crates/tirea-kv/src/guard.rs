//! Type guards over dynamic values.
//!
//! Predicates are plain functions `Fn(&Value) -> bool`, so they compose with
//! closures and with the combinators below. [`check`] turns a predicate into
//! a validation step; [`Checks`] does the same only when debug checks are
//! switched on.

use crate::{Key, KvError, KvResult, Value};
use std::fmt::Debug;

pub fn is_nullish(value: &Value) -> bool {
    value.is_null()
}

pub fn is_bool(value: &Value) -> bool {
    matches!(value, Value::Bool(_))
}

pub fn is_number(value: &Value) -> bool {
    matches!(value, Value::Int(_) | Value::Float(_))
}

pub fn is_string(value: &Value) -> bool {
    matches!(value, Value::String(_))
}

pub fn is_symbol(value: &Value) -> bool {
    matches!(value, Value::Symbol(_))
}

pub fn is_function(value: &Value) -> bool {
    matches!(value, Value::Function(_))
}

/// Array check.
pub fn is_indexed(value: &Value) -> bool {
    matches!(value, Value::Indexed(_))
}

/// Record check. Arrays are not records.
pub fn is_keyed(value: &Value) -> bool {
    matches!(value, Value::Keyed(_))
}

pub fn is_container(value: &Value) -> bool {
    value.is_container()
}

/// A value usable as a key: a string, a number, or a symbol.
pub fn is_key(value: &Value) -> bool {
    is_string(value) || is_number(value) || is_symbol(value)
}

/// Accept nullish values in addition to whatever `predicate` accepts.
pub fn maybe<P>(predicate: P) -> impl Fn(&Value) -> bool
where
    P: Fn(&Value) -> bool,
{
    move |value| is_nullish(value) || predicate(value)
}

/// Accept arrays whose every item satisfies `predicate`.
pub fn array_of<P>(predicate: P) -> impl Fn(&Value) -> bool
where
    P: Fn(&Value) -> bool,
{
    move |value| match value {
        Value::Indexed(items) => items.iter().all(&predicate),
        _ => false,
    }
}

/// A boxed predicate, for heterogeneous collections such as [`shape`].
pub type Predicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Accept records whose listed fields each satisfy their predicate.
///
/// Missing fields are checked as `Null`, so wrap optional fields in [`maybe`].
///
/// ```
/// use tirea_kv::guard::{is_number, is_string, maybe, shape, Predicate};
/// use tirea_kv::Value;
/// use serde_json::json;
///
/// let is_profile = shape(vec![
///     ("id".into(), Box::new(is_number) as Predicate),
///     ("nick".into(), Box::new(maybe(is_string)) as Predicate),
/// ]);
/// assert!(is_profile(&Value::from(json!({"id": 1}))));
/// assert!(!is_profile(&Value::from(json!({"id": "1"}))));
/// ```
pub fn shape(fields: Vec<(Key, Predicate)>) -> impl Fn(&Value) -> bool {
    move |value| match value {
        Value::Keyed(entries) => fields
            .iter()
            .all(|(key, predicate)| predicate(entries.get(key).unwrap_or(&Value::Null))),
        _ => false,
    }
}

fn predicate_name<P>(_: &P) -> &'static str {
    std::any::type_name::<P>()
}

/// Return `value` if `predicate` holds, otherwise a validation error.
///
/// ```
/// use tirea_kv::guard::{check, is_number};
/// use tirea_kv::Value;
///
/// let v = Value::from(10);
/// assert!(check(&v, is_number, "expected a number").is_ok());
/// assert!(check(&Value::from("10"), is_number, "expected a number").is_err());
/// ```
pub fn check<'a, T, P>(value: &'a T, predicate: P, message: &str) -> KvResult<&'a T>
where
    T: Debug + ?Sized,
    P: Fn(&T) -> bool,
{
    if predicate(value) {
        Ok(value)
    } else {
        Err(KvError::validation(
            format!("{value:?}"),
            predicate_name(&predicate),
            message,
        ))
    }
}

/// Debug-time guards, switched on and off by the caller's configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Checks {
    enabled: bool,
}

impl Checks {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Like [`check`], but passes everything through when disabled.
    pub fn debug<'a, T, P>(&self, value: &'a T, predicate: P, message: &str) -> KvResult<&'a T>
    where
        T: Debug + ?Sized,
        P: Fn(&T) -> bool,
    {
        if !self.enabled {
            return Ok(value);
        }
        check(value, predicate, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Func, Symbol};
    use serde_json::json;

    #[test]
    fn test_primitive_predicates() {
        assert!(is_string(&Value::from("")));
        assert!(!is_string(&Value::from(false)));
        assert!(is_number(&Value::from(10)));
        assert!(is_number(&Value::from(0.5)));
        assert!(is_bool(&Value::from(false)));
        assert!(!is_bool(&Value::Null));
        assert!(is_symbol(&Value::from(Symbol::new("hello"))));
        assert!(is_function(&Value::from(Func::new(|v| v.clone()))));
        assert!(is_nullish(&Value::Null));
        assert!(!is_nullish(&Value::from(0)));
        assert!(!is_nullish(&Value::from("")));
    }

    #[test]
    fn test_container_predicates() {
        let arr = Value::from(json!([]));
        let obj = Value::from(json!({}));
        assert!(is_indexed(&arr));
        assert!(!is_keyed(&arr));
        assert!(is_keyed(&obj));
        assert!(!is_keyed(&Value::Null));
        assert!(is_container(&arr) && is_container(&obj));
    }

    #[test]
    fn test_is_key() {
        assert!(is_key(&Value::from("a")));
        assert!(is_key(&Value::from(1)));
        assert!(is_key(&Value::from(Symbol::new("k"))));
        assert!(!is_key(&Value::Null));
        assert!(!is_key(&Value::from(true)));
        assert!(!is_key(&Value::from(json!(["a"]))));
    }

    #[test]
    fn test_maybe() {
        let is_maybe_string = maybe(is_string);
        assert!(is_maybe_string(&Value::from("a")));
        assert!(is_maybe_string(&Value::Null));
        assert!(!is_maybe_string(&Value::from(false)));
    }

    #[test]
    fn test_array_of() {
        let is_strings = array_of(is_string);
        assert!(is_strings(&Value::from(json!(["a", "b", "c"]))));
        assert!(!is_strings(&Value::from(json!(["a", "b", "c", 1]))));
        assert!(!is_strings(&Value::from("abc")));
    }

    #[test]
    fn test_nested_shape() {
        let is_social: Predicate = Box::new(shape(vec![(
            "url".into(),
            Box::new(is_string) as Predicate,
        )]));
        let is_profile = shape(vec![
            ("id".into(), Box::new(is_number) as Predicate),
            ("username".into(), Box::new(is_string) as Predicate),
            ("socials".into(), Box::new(array_of(is_social)) as Predicate),
        ]);
        let profile = Value::from(json!({
            "id": 1,
            "username": "user",
            "socials": [{"url": "http://example.com"}]
        }));
        assert!(is_profile(&profile));
        assert!(!is_profile(&Value::from(json!({}))));
    }

    #[test]
    fn test_check_reports_value_and_predicate() {
        let err = check(&Value::from(true), is_key, "bad key").unwrap_err();
        match err {
            KvError::Validation {
                value,
                predicate,
                message,
            } => {
                assert_eq!(value, "true");
                assert!(predicate.ends_with("is_key"), "got {predicate}");
                assert_eq!(message, "bad key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_debug_checks_toggle() {
        let v = Value::from("not a number");
        assert!(Checks::new(false).debug(&v, is_number, "m").is_ok());
        assert!(Checks::new(true).debug(&v, is_number, "m").is_err());
        assert!(!Checks::default().enabled());
    }
}
