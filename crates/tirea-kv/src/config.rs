//! Accessor configuration.

use crate::KvResult;
use serde::{Deserialize, Serialize};

/// What `put` does when an intermediate value on the path is not a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingParents {
    /// Synthesize an empty container (array if the next key is an index).
    #[default]
    Create,
    /// Fail with `KvError::MissingParent`.
    Reject,
}

/// Default for [`KvConfig::max_index_gap`].
pub const DEFAULT_MAX_INDEX_GAP: usize = 1 << 20;

/// Configuration for an [`Accessor`](crate::Accessor).
///
/// # Examples
///
/// ```
/// use tirea_kv::{KvConfig, MissingParents};
///
/// let config = KvConfig::from_json(r#"{"missing_parents": "reject"}"#).unwrap();
/// assert_eq!(config.missing_parents, MissingParents::Reject);
/// assert!(!config.debug_checks);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvConfig {
    /// Policy for missing intermediate containers.
    pub missing_parents: MissingParents,
    /// Run extra guards on accessor inputs and outputs.
    pub debug_checks: bool,
    /// How far past the end of an array a write may land. The slots in
    /// between are filled with `Null`.
    pub max_index_gap: usize,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            missing_parents: MissingParents::default(),
            debug_checks: false,
            max_index_gap: DEFAULT_MAX_INDEX_GAP,
        }
    }
}

impl KvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize a config from a JSON string. Missing fields take defaults.
    pub fn from_json(json: &str) -> KvResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_missing_parents(mut self, policy: MissingParents) -> Self {
        self.missing_parents = policy;
        self
    }

    pub fn with_debug_checks(mut self, enabled: bool) -> Self {
        self.debug_checks = enabled;
        self
    }

    pub fn with_max_index_gap(mut self, gap: usize) -> Self {
        self.max_index_gap = gap;
        self
    }
}
