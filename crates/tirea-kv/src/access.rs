//! Immutable path access.
//!
//! `put` rebuilds only the chain of containers from the root down to the
//! written slot. Every other subtree is shared by reference with the input,
//! and every rebuilt container is frozen. Writing a value that is already
//! `same` as the current one returns the input root itself.

use crate::freeze::freeze;
use crate::guard::{is_container, maybe, Checks};
use crate::value::grow_to;
use crate::{Indexed, Key, KvConfig, KvError, KvResult, Keyed, MissingParents, Path, Value};
use indexmap::IndexMap;
use tracing::{debug, trace};

/// Largest index an array slot may be written at.
pub const MAX_INDEX: usize = u32::MAX as usize - 1;

/// Path accessor bound to a [`KvConfig`].
///
/// The free functions [`get`], [`put`], [`put_key`], [`update`] and [`patch`]
/// use the default configuration.
///
/// # Examples
///
/// ```
/// use tirea_kv::{Accessor, KvConfig, KvError, MissingParents, Value, path};
/// use serde_json::json;
///
/// let strict = Accessor::new(KvConfig::new().with_missing_parents(MissingParents::Reject));
/// let doc = Value::from(json!({"a": {"b": 1}}));
///
/// assert!(strict.put(&doc, path!("a", "b"), 2).is_ok());
/// assert!(matches!(
///     strict.put(&doc, path!("x", "y"), 2),
///     Err(KvError::MissingParent { .. })
/// ));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Accessor {
    config: KvConfig,
}

impl Accessor {
    pub fn new(config: KvConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &KvConfig {
        &self.config
    }

    #[inline]
    fn checks(&self) -> Checks {
        Checks::new(self.config.debug_checks)
    }

    /// Resolve `path` against `root`. See [`get`].
    pub fn get<'a>(&self, root: &'a Value, path: impl Into<Path>) -> Option<&'a Value> {
        get_in(root, &path.into())
    }

    /// Replace one key of `container`. See [`put_key`].
    pub fn put_key(
        &self,
        container: &Value,
        key: impl Into<Key>,
        value: impl Into<Value>,
    ) -> KvResult<Value> {
        let path = Path::from(key.into());
        self.splice(container, value.into(), &path, 0)
    }

    /// Write `value` at `path`. See [`put`].
    pub fn put(
        &self,
        root: &Value,
        path: impl Into<Path>,
        value: impl Into<Value>,
    ) -> KvResult<Value> {
        self.put_path(root, &path.into(), value.into())
    }

    /// Read, transform, write. See [`update`].
    pub fn update<F>(&self, root: &Value, path: impl Into<Path>, advance: F) -> KvResult<Value>
    where
        F: FnOnce(Option<&Value>) -> Value,
    {
        let path = path.into();
        let next = advance(get_in(root, &path));
        self.put_path(root, &path, next)
    }

    /// Shallow merge into a new frozen record. See [`patch`].
    pub fn patch(&self, root: &Value, fields: &Value) -> KvResult<Value> {
        self.checks()
            .debug(fields, maybe(is_container), "patch fields must be a container or null")?;

        let mut merged = IndexMap::new();
        extend_entries(&mut merged, root)?;
        extend_entries(&mut merged, fields)?;
        Ok(freeze(&Value::from(Keyed::from_map(merged))))
    }

    fn put_path(&self, root: &Value, path: &Path, value: Value) -> KvResult<Value> {
        if path.is_empty() {
            return Err(KvError::EmptyPath);
        }

        let result = self.put_at(root, path, 0, value)?;
        self.checks().debug(
            &result,
            |out: &Value| out.same(root) || out.is_frozen(),
            "put returned an unfrozen root",
        )?;
        Ok(result)
    }

    /// Write below `current`, which sits at `path[..depth]`.
    fn put_at(&self, current: &Value, path: &Path, depth: usize, value: Value) -> KvResult<Value> {
        if depth + 1 == path.len() {
            return self.splice(current, value, path, depth);
        }

        let key = &path[depth];
        ensure_slot(current, path, depth)?;

        let child = match current.child(key) {
            Some(child) if child.is_container() => child.clone(),
            existing => {
                let found = existing.map_or("nothing", |v| v.type_name());
                match self.config.missing_parents {
                    MissingParents::Create => {
                        let as_array = path[depth + 1].is_array_like();
                        trace!(
                            path = %path.prefix(depth + 1),
                            replaced = found,
                            as_array,
                            "creating missing branch"
                        );
                        if as_array {
                            Value::empty_indexed()
                        } else {
                            Value::empty_keyed()
                        }
                    }
                    MissingParents::Reject => {
                        debug!(
                            path = %path.prefix(depth + 1),
                            found,
                            "rejecting write below a missing parent"
                        );
                        return Err(KvError::missing_parent(path.prefix(depth + 1)));
                    }
                }
            }
        };

        let child = self.put_at(&child, path, depth + 1, value)?;
        self.splice(current, child, path, depth)
    }

    /// One-level copy of `container` with `path[depth]` set to `value`.
    fn splice(&self, container: &Value, value: Value, path: &Path, depth: usize) -> KvResult<Value> {
        ensure_slot(container, path, depth)?;
        let key = &path[depth];

        if container.child(key).is_some_and(|current| current.same(&value)) {
            trace!(path = %path.prefix(depth + 1), "value unchanged, keeping container");
            return Ok(container.clone());
        }

        let copy = match (container, key.array_index()) {
            (Value::Indexed(items), Some(index)) => {
                let mut items = items.as_slice().to_vec();
                grow_to(&mut items, index, self.config.max_index_gap).map_err(|max| {
                    debug!(path = %path.prefix(depth), index, max, "rejecting array growth");
                    KvError::index_out_of_range(path.prefix(depth), index, max)
                })?;
                items[index] = value;
                Value::from(Indexed::from_vec(items))
            }
            (Value::Keyed(entries), _) => {
                let mut entries = entries.entries().clone();
                entries.insert(key.record_key().into_owned(), value);
                Value::from(Keyed::from_map(entries))
            }
            (other, _) => {
                return Err(KvError::invalid_container(
                    path.prefix(depth + 1),
                    other.type_name(),
                ))
            }
        };
        Ok(freeze(&copy))
    }
}

/// Check that `container` can hold `path[depth]`.
fn ensure_slot(container: &Value, path: &Path, depth: usize) -> KvResult<()> {
    match container {
        Value::Indexed(_) => match path[depth].array_index() {
            Some(index) if index > MAX_INDEX => Err(KvError::index_out_of_range(
                path.prefix(depth),
                index,
                MAX_INDEX,
            )),
            Some(_) => Ok(()),
            None => Err(KvError::invalid_container(path.prefix(depth + 1), "array")),
        },
        Value::Keyed(_) => Ok(()),
        other => Err(KvError::invalid_container(
            path.prefix(depth + 1),
            other.type_name(),
        )),
    }
}

fn extend_entries(target: &mut IndexMap<Key, Value>, source: &Value) -> KvResult<()> {
    match source {
        Value::Null => {}
        Value::Keyed(entries) => {
            target.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Value::Indexed(items) => {
            target.extend(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (Key::Str(i.to_string()), v.clone())),
            );
        }
        other => return Err(KvError::invalid_container(Path::root(), other.type_name())),
    }
    Ok(())
}

fn get_in<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    path.iter()
        .try_fold(root, |current, key| current.child(key))
        .filter(|found| !found.is_null())
}

/// Get a deep value by key or path.
///
/// Returns `None` when `root` is nullish, when any step lands on a nullish
/// value or a non-container, or when a key is missing. Never fails.
///
/// ```
/// use tirea_kv::{get, path, Value};
/// use serde_json::json;
///
/// let doc = Value::from(json!({"a": {"b": {"c": 1}}}));
/// assert_eq!(get(&doc, path!("a", "b", "c")), Some(&Value::from(1)));
/// assert_eq!(get(&doc, ["a", "x", "c"]), None);
/// assert_eq!(get(&Value::Null, "a"), None);
/// ```
pub fn get<'a>(root: &'a Value, path: impl Into<Path>) -> Option<&'a Value> {
    Accessor::default().get(root, path)
}

/// Produce a frozen one-level copy of `container` with `key` set to `value`.
///
/// Returns `container` itself when it already holds a `same` value at `key`.
/// Arrays grow with `Null` holes when `key` is past the end, by at most
/// [`KvConfig::max_index_gap`] slots.
pub fn put_key(container: &Value, key: impl Into<Key>, value: impl Into<Value>) -> KvResult<Value> {
    Accessor::default().put_key(container, key, value)
}

/// Write `value` at `path`, returning the new root.
///
/// Missing or non-container intermediate values are replaced by empty
/// containers: an array when the following key is an index, a record
/// otherwise. Only the containers along the path are copied, and each copy
/// is frozen. When nothing changes the input root is returned as is.
///
/// ```
/// use tirea_kv::{get, put, path, Value};
/// use serde_json::json;
///
/// let doc = Value::from(json!({"a": {"b": {"c": 1}}, "z": {"keep": true}}));
///
/// let next = put(&doc, path!("a", "b", "c"), 2).unwrap();
/// assert_eq!(next["a"]["b"]["c"], 2);
/// assert_eq!(doc["a"]["b"]["c"], 1);
/// assert!(next["z"].same(&doc["z"]));
///
/// let unchanged = put(&doc, path!("a", "b", "c"), 1).unwrap();
/// assert!(unchanged.same(&doc));
/// ```
pub fn put(root: &Value, path: impl Into<Path>, value: impl Into<Value>) -> KvResult<Value> {
    Accessor::default().put(root, path, value)
}

/// Write the result of `advance(get(root, path))` back at `path`.
///
/// ```
/// use tirea_kv::{update, path, Value};
/// use serde_json::json;
///
/// let doc = Value::from(json!({"a": {"b": {"c": 1}}}));
/// let next = update(&doc, path!("a", "b", "c"), |v| {
///     Value::from(v.and_then(Value::as_i64).unwrap_or(0) + 1)
/// })
/// .unwrap();
/// assert_eq!(next["a"]["b"]["c"], 2);
/// ```
pub fn update<F>(root: &Value, path: impl Into<Path>, advance: F) -> KvResult<Value>
where
    F: FnOnce(Option<&Value>) -> Value,
{
    Accessor::default().update(root, path, advance)
}

/// Shallow-merge `fields` over `root` into a new frozen record.
///
/// Arrays contribute their items under decimal string keys. Always
/// allocates, even when no field changes.
pub fn patch(root: &Value, fields: &Value) -> KvResult<Value> {
    Accessor::default().patch(root, fields)
}
