//! Error types for tirea-kv operations.

use crate::Path;
use thiserror::Error;

/// Result type alias for tirea-kv operations.
pub type KvResult<T> = Result<T, KvError>;

/// Errors that can occur while reading or rebuilding a tree.
#[derive(Debug, Error)]
pub enum KvError {
    /// A value failed a guard predicate.
    #[error("validation failed: {message} (value: {value}, predicate: {predicate})")]
    Validation {
        /// Debug rendering of the offending value.
        value: String,
        /// Name of the predicate that rejected the value.
        predicate: &'static str,
        /// Diagnostic message.
        message: String,
    },

    /// A write was requested with a zero-length path.
    #[error("validation failed: path must not be empty")]
    EmptyPath,

    /// Index-assignment into something that cannot hold the key.
    #[error("cannot assign {path}: target is {found}, not a container for this key")]
    InvalidContainer {
        /// Path of the slot that was being written.
        path: Path,
        /// Type of the value found in place of a container.
        found: &'static str,
    },

    /// An intermediate container is missing and auto-creation is disabled.
    #[error("missing parent container at {path}")]
    MissingParent {
        /// Path of the missing intermediate value.
        path: Path,
    },

    /// Array index beyond the largest representable index.
    #[error("index {index} out of range (max: {max}) at {path}")]
    IndexOutOfRange {
        /// Path of the array.
        path: Path,
        /// The index that was written.
        index: usize,
        /// The largest allowed index.
        max: usize,
    },

    /// In-place mutation of a frozen container.
    #[error("cannot mutate frozen {found}")]
    Frozen {
        /// Type of the frozen container.
        found: &'static str,
    },

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KvError {
    /// Create a validation error.
    #[inline]
    pub fn validation(
        value: impl Into<String>,
        predicate: &'static str,
        message: impl Into<String>,
    ) -> Self {
        KvError::Validation {
            value: value.into(),
            predicate,
            message: message.into(),
        }
    }

    /// Create an invalid container error.
    #[inline]
    pub fn invalid_container(path: Path, found: &'static str) -> Self {
        KvError::InvalidContainer { path, found }
    }

    /// Create a missing parent error.
    #[inline]
    pub fn missing_parent(path: Path) -> Self {
        KvError::MissingParent { path }
    }

    /// Create an index out of range error.
    #[inline]
    pub fn index_out_of_range(path: Path, index: usize, max: usize) -> Self {
        KvError::IndexOutOfRange { path, index, max }
    }

    /// Create a frozen container error.
    #[inline]
    pub fn frozen(found: &'static str) -> Self {
        KvError::Frozen { found }
    }

    /// Whether this error comes from input validation (bad key or empty path).
    pub fn is_validation(&self) -> bool {
        matches!(self, KvError::Validation { .. } | KvError::EmptyPath)
    }
}
