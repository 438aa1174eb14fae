//! Keys and key paths for navigating nested containers.
//!
//! A path is a sequence of keys that locates a node in a tree, root-to-leaf.
//! Each key is a string, an array index, or a unique [`Symbol`].

use crate::guard::{array_of, check, is_key};
use crate::{KvResult, Value};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// A unique key token.
///
/// Two symbols are the same only if one is a clone of the other, even when
/// their descriptions match.
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Arc<str>,
}

impl Symbol {
    /// Create a new, unique symbol.
    pub fn new(description: impl AsRef<str>) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: Arc::from(description.as_ref()),
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

/// A single key in a path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Named property: `{"key": value}`
    Str(String),
    /// Array index: `[index]`
    Index(usize),
    /// Unique token property.
    Symbol(Symbol),
}

impl Key {
    /// Create a string key.
    #[inline]
    pub fn str(k: impl Into<String>) -> Self {
        Key::Str(k.into())
    }

    /// Returns true if this key addresses an array slot.
    ///
    /// Decides which container kind is synthesized for a missing branch.
    #[inline]
    pub fn is_array_like(&self) -> bool {
        matches!(self, Key::Index(_))
    }

    /// The array slot this key addresses, if any.
    ///
    /// Index keys and canonical decimal strings (`"0"`, `"17"`, but not
    /// `"017"` or `"+1"`) address slots; everything else does not.
    pub fn array_index(&self) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Str(s) if is_canonical_index(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// The form this key is stored under in a record.
    ///
    /// Records hold string and symbol keys only, so `Index(3)` and `"3"` name
    /// the same entry.
    pub fn record_key(&self) -> Cow<'_, Key> {
        match self {
            Key::Index(i) => Cow::Owned(Key::Str(i.to_string())),
            other => Cow::Borrowed(other),
        }
    }

    /// Owned variant of [`Key::record_key`].
    pub fn into_record_key(self) -> Key {
        match self {
            Key::Index(i) => Key::Str(i.to_string()),
            other => other,
        }
    }
}

fn is_canonical_index(s: &str) -> bool {
    match s.as_bytes() {
        [b'0'] => true,
        [b'1'..=b'9', rest @ ..] => rest.iter().all(u8::is_ascii_digit),
        _ => false,
    }
}

/// Property-key spelling of a number that is not a valid index.
///
/// Follows the ECMAScript `Number::toString` layout: `NaN`, `Infinity`, and
/// exponent form outside `1e-6 <= |f| < 1e21`.
fn number_key(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_owned();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-6..1e21).contains(&magnitude) {
        let formatted = format!("{f:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => formatted,
        };
    }
    f.to_string()
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(k) => write!(f, ".{}", k),
            Key::Index(i) => write!(f, "[{}]", i),
            Key::Symbol(s) => write!(f, "[@{}]", s.description),
        }
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_owned())
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

impl From<Symbol> for Key {
    fn from(s: Symbol) -> Self {
        Key::Symbol(s)
    }
}

impl From<&Symbol> for Key {
    fn from(s: &Symbol) -> Self {
        Key::Symbol(s.clone())
    }
}

impl TryFrom<&Value> for Key {
    type Error = crate::KvError;

    /// Convert a dynamic value into a key, rejecting anything `is_key` refuses.
    ///
    /// Non-negative whole numbers become indices; other numbers become their
    /// decimal string form.
    fn try_from(value: &Value) -> KvResult<Self> {
        const MESSAGE: &str = "value is not a string, number or symbol";
        check(value, is_key, MESSAGE)?;
        match value {
            Value::String(s) => Ok(Key::Str(s.to_string())),
            Value::Int(i) => Ok(match usize::try_from(*i) {
                Ok(i) => Key::Index(i),
                Err(_) => Key::Str(i.to_string()),
            }),
            Value::Float(f) if f.fract() == 0.0 && *f >= 0.0 && *f <= usize::MAX as f64 => {
                Ok(Key::Index(*f as usize))
            }
            Value::Float(f) => Ok(Key::Str(number_key(*f))),
            Value::Symbol(s) => Ok(Key::Symbol(s.clone())),
            other => Err(crate::KvError::validation(
                format!("{other:?}"),
                "is_key",
                MESSAGE,
            )),
        }
    }
}

/// A complete path into a tree.
///
/// # Examples
///
/// ```
/// use tirea_kv::Path;
///
/// let path = Path::root().key("users").index(0).key("name");
/// assert_eq!(path.len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Key>);

impl Path {
    /// Create an empty path (root).
    #[inline]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create an empty path (alias for `new`).
    #[inline]
    pub fn root() -> Self {
        Self::new()
    }

    /// Create a path from a vector of keys.
    #[inline]
    pub fn from_keys(keys: Vec<Key>) -> Self {
        Self(keys)
    }

    /// Build a path from a dynamic value: a single key, or an array of keys.
    pub fn try_from_value(value: &Value) -> KvResult<Self> {
        match value {
            Value::Indexed(items) => {
                check(value, array_of(is_key), "path contains a non-key segment")?;
                items.iter().map(Key::try_from).collect()
            }
            single => Ok(Self(vec![Key::try_from(single)?])),
        }
    }

    /// Append a string key and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Key::Str(k.into()));
        self
    }

    /// Append an index key and return self (builder pattern).
    #[inline]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Key::Index(i));
        self
    }

    /// Append a symbol key and return self (builder pattern).
    #[inline]
    pub fn symbol(mut self, s: Symbol) -> Self {
        self.0.push(Key::Symbol(s));
        self
    }

    /// Push a key onto the path (mutating).
    #[inline]
    pub fn push(&mut self, key: Key) {
        self.0.push(key);
    }

    /// Pop the last key from the path.
    #[inline]
    pub fn pop(&mut self) -> Option<Key> {
        self.0.pop()
    }

    /// Get the keys of this path.
    #[inline]
    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    /// Check if this path is empty (root).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of keys in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get the first key.
    #[inline]
    pub fn first(&self) -> Option<&Key> {
        self.0.first()
    }

    /// Get the parent path (path without the last key).
    #[inline]
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            let mut p = self.clone();
            p.pop();
            Some(p)
        }
    }

    /// Get the path made of the first `len` keys.
    #[inline]
    pub fn prefix(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Iterate over the keys.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.0.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for key in &self.0 {
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

impl FromIterator<Key> for Path {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl IntoIterator for Path {
    type Item = Key;
    type IntoIter = std::vec::IntoIter<Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Key;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl From<&Path> for Path {
    fn from(p: &Path) -> Self {
        p.clone()
    }
}

impl From<Key> for Path {
    fn from(k: Key) -> Self {
        Path(vec![k])
    }
}

impl From<&str> for Path {
    fn from(k: &str) -> Self {
        Path(vec![Key::from(k)])
    }
}

impl From<String> for Path {
    fn from(k: String) -> Self {
        Path(vec![Key::from(k)])
    }
}

impl From<usize> for Path {
    fn from(i: usize) -> Self {
        Path(vec![Key::Index(i)])
    }
}

impl From<Symbol> for Path {
    fn from(s: Symbol) -> Self {
        Path(vec![Key::Symbol(s)])
    }
}

impl<K: Into<Key>> From<Vec<K>> for Path {
    fn from(keys: Vec<K>) -> Self {
        keys.into_iter().map(Into::into).collect()
    }
}

impl<K: Into<Key>, const N: usize> From<[K; N]> for Path {
    fn from(keys: [K; N]) -> Self {
        keys.into_iter().map(Into::into).collect()
    }
}

/// Parse a dotted path such as `"users.0.name"`.
///
/// Segments made only of ASCII digits become index keys; everything else is
/// a string key. Empty segments are skipped.
pub fn parse_path(path: &str) -> Path {
    let mut result = Path::root();
    for segment in path.split('.') {
        if segment.is_empty() {
            continue;
        }
        match segment.parse::<usize>() {
            Ok(i) if segment.bytes().all(|b| b.is_ascii_digit()) => result = result.index(i),
            _ => result = result.key(segment),
        }
    }
    result
}

/// Construct a `Path` from a sequence of keys.
///
/// # Examples
///
/// ```
/// use tirea_kv::path;
///
/// // String literals become Str keys
/// let p = path!("users", "alice", "email");
///
/// // Numbers become Index keys
/// let p = path!("items", 0, "name");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($key:expr),+ $(,)?) => {{
        let mut p = $crate::Path::root();
        $(
            p.push($crate::path!(@key $key));
        )+
        p
    }};
    (@key $key:expr) => {
        $crate::Key::from($key)
    };
}
