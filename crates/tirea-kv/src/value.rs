//! Dynamic value model.
//!
//! A [`Value`] is a primitive, a function, or a container. Containers are
//! shared by `Arc` so that an update can reuse every subtree it does not
//! touch. Each container carries a freeze flag; once set, the in-place
//! mutators reject further writes.

use crate::{Key, KvError, KvResult, Path, Symbol, DEFAULT_MAX_INDEX_GAP, MAX_INDEX};
use indexmap::IndexMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

static NULL: Value = Value::Null;

/// A function value.
///
/// Functions compare by pointer identity.
#[derive(Clone)]
pub struct Func(Arc<dyn Fn(&Value) -> Value + Send + Sync>);

impl Func {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invoke the function.
    #[inline]
    pub fn call(&self, arg: &Value) -> Value {
        (self.0)(arg)
    }

    /// Whether both handles point at the same function.
    #[inline]
    pub fn ptr_eq(&self, other: &Func) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<function>")
    }
}

/// An ordered, integer-indexed container.
#[derive(Default)]
pub struct Indexed {
    items: Vec<Value>,
    frozen: AtomicBool,
}

impl Indexed {
    /// Create an empty, unfrozen sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unfrozen sequence from items.
    pub fn from_vec(items: Vec<Value>) -> Self {
        Self {
            items,
            frozen: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    /// Whether the freeze flag is set.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Set the freeze flag. Visible through every handle to this container.
    #[inline]
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    /// Replace the item at `index`, growing with `Null` holes if needed.
    ///
    /// At most [`DEFAULT_MAX_INDEX_GAP`] holes are added.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> KvResult<()> {
        self.ensure_thawed()?;
        grow_to(&mut self.items, index, DEFAULT_MAX_INDEX_GAP)
            .map_err(|max| KvError::index_out_of_range(Path::root(), index, max))?;
        self.items[index] = value.into();
        Ok(())
    }

    /// Append an item.
    pub fn push(&mut self, value: impl Into<Value>) -> KvResult<()> {
        self.ensure_thawed()?;
        self.items.push(value.into());
        Ok(())
    }

    fn ensure_thawed(&self) -> KvResult<()> {
        if self.is_frozen() {
            return Err(KvError::frozen("array"));
        }
        Ok(())
    }
}

/// Pad `items` with `Null` so that `index` is in bounds.
///
/// On failure returns the largest index that could have been written: the
/// hole would exceed `max_gap`, pass [`MAX_INDEX`], or not fit in memory.
pub(crate) fn grow_to(items: &mut Vec<Value>, index: usize, max_gap: usize) -> Result<(), usize> {
    let len = items.len();
    if index < len {
        return Ok(());
    }
    let max = len.saturating_add(max_gap).min(MAX_INDEX);
    if index > max {
        return Err(max);
    }
    items.try_reserve_exact(index + 1 - len).map_err(|_| max)?;
    items.resize(index + 1, Value::Null);
    Ok(())
}

impl FromIterator<Value> for Indexed {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl PartialEq for Indexed {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl fmt::Debug for Indexed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

/// An insertion-ordered map from keys to values.
///
/// Index keys are stored as their decimal string (see [`Key::record_key`]).
#[derive(Default)]
pub struct Keyed {
    entries: IndexMap<Key, Value>,
    frozen: AtomicBool,
}

impl Keyed {
    /// Create an empty, unfrozen map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unfrozen map from entries.
    pub fn from_map(entries: IndexMap<Key, Value>) -> Self {
        let entries = if entries.keys().any(Key::is_array_like) {
            entries
                .into_iter()
                .map(|(k, v)| (k.into_record_key(), v))
                .collect()
        } else {
            entries
        };
        Self {
            entries,
            frozen: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.get(&*key.record_key())
    }

    #[inline]
    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(&*key.record_key())
    }

    #[inline]
    pub fn keys(&self) -> indexmap::map::Keys<'_, Key, Value> {
        self.entries.keys()
    }

    #[inline]
    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, Value> {
        self.entries.iter()
    }

    /// Borrow the underlying entries.
    #[inline]
    pub fn entries(&self) -> &IndexMap<Key, Value> {
        &self.entries
    }

    /// Whether the freeze flag is set.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Set the freeze flag. Visible through every handle to this container.
    #[inline]
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    /// Insert or overwrite an entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> KvResult<Option<Value>> {
        self.ensure_thawed()?;
        let key: Key = key.into();
        Ok(self.entries.insert(key.into_record_key(), value.into()))
    }

    /// Remove an entry, keeping the order of the rest.
    pub fn remove(&mut self, key: &Key) -> KvResult<Option<Value>> {
        self.ensure_thawed()?;
        Ok(self.entries.shift_remove(&*key.record_key()))
    }

    fn ensure_thawed(&self) -> KvResult<()> {
        if self.is_frozen() {
            return Err(KvError::frozen("object"));
        }
        Ok(())
    }
}

impl FromIterator<(Key, Value)> for Keyed {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

impl PartialEq for Keyed {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl fmt::Debug for Keyed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(&self.entries).finish()
    }
}

/// A dynamically shaped value.
#[derive(Clone, Default)]
pub enum Value {
    /// Nullish: both "null" and "undefined".
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Arc<str>),
    Symbol(Symbol),
    Function(Func),
    /// Array-like container.
    Indexed(Arc<Indexed>),
    /// Record-like container.
    Keyed(Arc<Keyed>),
}

impl Value {
    /// Build an unfrozen array from items.
    pub fn indexed(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Indexed(Arc::new(items.into_iter().collect()))
    }

    /// Build an unfrozen record from entries.
    pub fn keyed<K: Into<Key>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Keyed(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// An empty, unfrozen array.
    pub fn empty_indexed() -> Self {
        Value::Indexed(Arc::new(Indexed::new()))
    }

    /// An empty, unfrozen record.
    pub fn empty_keyed() -> Self {
        Value::Keyed(Arc::new(Keyed::new()))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value can be indexed into.
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Indexed(_) | Value::Keyed(_))
    }

    #[inline]
    pub fn as_indexed(&self) -> Option<&Indexed> {
        match self {
            Value::Indexed(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_keyed(&self) -> Option<&Keyed> {
        match self {
            Value::Keyed(entries) => Some(entries),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up one key without descending further.
    ///
    /// Non-containers and keys that name no array slot yield `None`.
    pub fn child(&self, key: &Key) -> Option<&Value> {
        match self {
            Value::Indexed(items) => key.array_index().and_then(|i| items.get(i)),
            Value::Keyed(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Identity comparison.
    ///
    /// Primitives compare by value (numbers numerically, NaN never matches),
    /// symbols by token, functions and containers by pointer.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => {
                int_equals_float(*i, *f)
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Indexed(a), Value::Indexed(b)) => Arc::ptr_eq(a, b),
            (Value::Keyed(a), Value::Keyed(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Shallow frozen state. Non-containers are always frozen.
    pub fn is_frozen(&self) -> bool {
        match self {
            Value::Indexed(items) => items.is_frozen(),
            Value::Keyed(entries) => entries.is_frozen(),
            _ => true,
        }
    }

    /// Get the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Function(_) => "function",
            Value::Indexed(_) => "array",
            Value::Keyed(_) => "object",
        }
    }
}

/// Exact comparison without rounding `i` to the nearest float.
fn int_equals_float(i: i64, f: f64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 && f as i64 == i
}

impl PartialEq for Value {
    /// Deep structural equality; freeze flags are ignored.
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Indexed(a), Value::Indexed(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::Keyed(a), Value::Keyed(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => self.same(other),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Symbol(s) => write!(f, "{s:?}"),
            Value::Function(func) => write!(f, "{func:?}"),
            Value::Indexed(items) => write!(f, "{:?}", &**items),
            Value::Keyed(entries) => write!(f, "{:?}", &**entries),
        }
    }
}

impl std::ops::Index<&str> for Value {
    type Output = Value;

    /// Read a string key, yielding `Null` when absent.
    fn index(&self, key: &str) -> &Value {
        match self {
            Value::Keyed(entries) => entries.get(&Key::from(key)).unwrap_or(&NULL),
            _ => &NULL,
        }
    }
}

impl std::ops::Index<usize> for Value {
    type Output = Value;

    /// Read an array slot, yielding `Null` when absent.
    fn index(&self, index: usize) -> &Value {
        self.child(&Key::Index(index)).unwrap_or(&NULL)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}

impl From<Func> for Value {
    fn from(f: Func) -> Self {
        Value::Function(f)
    }
}

impl From<Indexed> for Value {
    fn from(items: Indexed) -> Self {
        Value::Indexed(Arc::new(items))
    }
}

impl From<Keyed> for Value {
    fn from(entries: Keyed) -> Self {
        Value::Keyed(Arc::new(entries))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Indexed(Arc::new(Indexed::from_vec(items)))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    /// Build an unfrozen tree from JSON.
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => Value::indexed(items.into_iter().map(Value::from)),
            serde_json::Value::Object(map) => {
                Value::keyed(map.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

macro_rules! impl_partial_eq {
    ($($ty:ty => $pat:ident),* $(,)?) => {
        $(
            impl PartialEq<$ty> for Value {
                fn eq(&self, other: &$ty) -> bool {
                    self.same(&Value::$pat((*other).into()))
                }
            }
        )*
    };
}

impl_partial_eq!(i32 => Int, i64 => Int, f64 => Float, bool => Bool);

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}
