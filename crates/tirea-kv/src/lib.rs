//! Immutable key-path access over dynamically shaped trees.
//!
//! `tirea-kv` reads and rewrites deeply nested data without mutating it.
//! Updates copy only the containers on the path being written and share
//! every other subtree by reference with the input.
//!
//! # Core Concepts
//!
//! - **Value**: a primitive, a function, or a container (`Indexed` array or
//!   `Keyed` record) shared by `Arc`
//! - **Path**: an ordered list of `Key`s (string, index or `Symbol`)
//! - **get / put / update / patch**: the accessor operations
//! - **Freezing**: every container produced by `put` or `patch` is frozen,
//!   and frozen containers reject in-place mutation
//!
//! # Guarantees
//!
//! ```text
//! get(put(root, p, v), p)        == v
//! put(root, p, get(root, p))     is root     (same reference)
//! get(put(root, p, v), sibling)  is get(root, sibling)
//! ```
//!
//! # Quick Start
//!
//! ```
//! use tirea_kv::{get, put, patch, path, Value};
//! use serde_json::json;
//!
//! let doc = Value::from(json!({"user": {"name": "Alice"}, "settings": {"theme": "dark"}}));
//!
//! let next = put(&doc, path!("user", "roles", 0), "admin").unwrap();
//! assert_eq!(next["user"]["roles"][0], "admin");
//! assert_eq!(get(&doc, path!("user", "roles")), None); // original unchanged
//! assert!(next["settings"].same(&doc["settings"])); // shared, not copied
//!
//! let merged = patch(&next, &Value::from(json!({"version": 2}))).unwrap();
//! assert!(merged.is_frozen());
//! ```

mod access;
mod config;
mod error;
pub mod freeze;
pub mod guard;
mod key;
mod value;

pub use access::{get, patch, put, put_key, update, Accessor, MAX_INDEX};
pub use config::{KvConfig, MissingParents, DEFAULT_MAX_INDEX_GAP};
pub use error::{KvError, KvResult};
pub use key::{parse_path, Key, Path, Symbol};
pub use value::{Func, Indexed, Keyed, Value};
