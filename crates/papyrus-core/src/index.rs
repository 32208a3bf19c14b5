//! Index document handling
//!
//! The index document maps paper keys to entries. It is parsed in full
//! when a store opens and serialized in full on every synchronize.
//!
//! ## Format
//!
//! ```yaml
//! smith2019:
//!   title: Deep Things
//!   author:
//!   - Alice Smith
//!   - Bob Jones
//!   year: 2019
//! ```
//!
//! Output is block style with keys sorted, so rewriting an unchanged
//! document reproduces the same bytes and diffs stay one-entry-local.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::models::Entry;
use crate::storage::{StorageError, StorageResult};

/// In-memory index document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexDocument {
    entries: BTreeMap<String, Entry>,
}

impl IndexDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document
    ///
    /// An empty or `null` document is an empty index. `path` is only used
    /// in the error.
    pub fn parse(contents: &str, path: &Path) -> StorageResult<Self> {
        let parsed: Option<BTreeMap<String, Option<Entry>>> = if contents.trim().is_empty() {
            None
        } else {
            serde_yaml::from_str(contents).map_err(|e| StorageError::InvalidFormat {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?
        };

        let entries = parsed
            .unwrap_or_default()
            .into_iter()
            .map(|(key, entry)| (key, entry.unwrap_or_default()))
            .collect();

        Ok(Self { entries })
    }

    /// Serialize the whole document
    ///
    /// An empty document serializes to an empty string rather than `{}`.
    pub fn to_yaml(&self) -> StorageResult<String> {
        if self.entries.is_empty() {
            return Ok(String::new());
        }

        serde_yaml::to_string(&self.entries).map_err(StorageError::Serialize)
    }

    /// Paper keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Every author of every entry, deduplicated and sorted
    pub fn authors(&self) -> Vec<String> {
        self.entries
            .values()
            .flat_map(|entry| entry.authors().iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Titles of entries that have one, sorted
    pub fn titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self
            .entries
            .values()
            .filter_map(|entry| entry.title.clone())
            .collect();
        titles.sort();
        titles
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Insert `entry` under `key`, merging into an existing entry
    pub fn upsert(&mut self, key: impl Into<String>, entry: Entry) {
        self.entries.entry(key.into()).or_default().merge(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
