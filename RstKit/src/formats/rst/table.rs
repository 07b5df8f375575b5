//! RST table editing operations
//!
//! Provides the in-memory string table and functions for modifying it:
//! - Add, update, delete entries by hash or by name
//! - Bulk find-and-replace
//! - Merge tables

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::hash::HashAlgorithm;
use super::version::{Metadata, RstVersion};
use crate::error::{Error, Result};

/// Result of a bulk replace operation
#[derive(Debug, Clone, Default)]
pub struct ReplaceResult {
    /// Number of entries modified
    pub entries_modified: usize,
    /// Total number of replacements made
    pub replacements: usize,
    /// Hashes of modified entries
    pub modified_hashes: Vec<u64>,
}

/// An in-memory string table: masked hash keys mapped to strings
///
/// Keys are always stored masked to the width of the table's hash
/// algorithm; bits above the mask are dropped on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RstTable {
    metadata: Metadata,
    entries: HashMap<u64, String>,
}

impl RstTable {
    #[must_use]
    pub fn new(metadata: impl Into<Metadata>) -> Self {
        Self {
            metadata: metadata.into(),
            entries: HashMap::new(),
        }
    }

    /// Build a table from `(hash, text)` pairs. Later duplicates win.
    pub fn from_entries<I, S>(metadata: impl Into<Metadata>, entries: I) -> Self
    where
        I: IntoIterator<Item = (u64, S)>,
        S: Into<String>,
    {
        let mut table = Self::new(metadata);
        for (hash, text) in entries {
            table.insert(hash, text);
        }
        table
    }

    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[must_use]
    pub fn version(&self) -> RstVersion {
        self.metadata.version()
    }

    #[must_use]
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.metadata.hash_algorithm()
    }

    #[must_use]
    pub fn font_config(&self) -> Option<&str> {
        self.metadata.font_config()
    }

    /// Set the font config (only stored for version 2 tables)
    pub fn set_font_config(&mut self, font_config: Option<String>) {
        self.metadata.set_font_config(font_config);
    }

    /// Hash an entry name with this table's algorithm
    #[must_use]
    pub fn hash(&self, name: &str) -> u64 {
        self.hash_algorithm().hash(name)
    }

    fn mask(&self, hash: u64) -> u64 {
        hash & self.hash_algorithm().mask()
    }

    /// Insert or update an entry
    ///
    /// # Returns
    /// The previous text if the key was already present
    pub fn insert(&mut self, hash: u64, text: impl Into<String>) -> Option<String> {
        let key = self.mask(hash);
        self.entries.insert(key, text.into())
    }

    /// Insert an entry that must not exist yet
    pub fn try_insert(&mut self, hash: u64, text: impl Into<String>) -> Result<()> {
        let key = self.mask(hash);
        match self.entries.entry(key) {
            Entry::Occupied(_) => Err(Error::KeyConflict(key)),
            Entry::Vacant(slot) => {
                slot.insert(text.into());
                Ok(())
            }
        }
    }

    /// Insert or update an entry by name
    ///
    /// # Returns
    /// The key the entry was stored under
    pub fn insert_named(&mut self, name: &str, text: impl Into<String>) -> Result<u64> {
        if name.is_empty() {
            return Err(Error::InvalidArgument("entry name must not be empty".into()));
        }
        let key = self.hash(name);
        self.entries.insert(key, text.into());
        Ok(key)
    }

    #[must_use]
    pub fn get(&self, hash: u64) -> Option<&str> {
        self.entries.get(&self.mask(hash)).map(String::as_str)
    }

    pub fn get_mut(&mut self, hash: u64) -> Option<&mut String> {
        let key = self.mask(hash);
        self.entries.get_mut(&key)
    }

    #[must_use]
    pub fn get_named(&self, name: &str) -> Option<&str> {
        self.entries.get(&self.hash(name)).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, hash: u64) -> bool {
        self.entries.contains_key(&self.mask(hash))
    }

    pub fn remove(&mut self, hash: u64) -> Option<String> {
        let key = self.mask(hash);
        self.entries.remove(&key)
    }

    pub fn remove_named(&mut self, name: &str) -> Option<String> {
        let key = self.hash(name);
        self.entries.remove(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.entries.iter().map(|(&hash, text)| (hash, text.as_str()))
    }

    /// Entries sorted by ascending hash, the order they are written in
    #[must_use]
    pub fn sorted_entries(&self) -> Vec<(u64, &str)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by_key(|&(hash, _)| hash);
        entries
    }

    /// Number of distinct string bodies
    #[must_use]
    pub fn unique_text_count(&self) -> usize {
        let mut texts: Vec<&str> = self.entries.values().map(String::as_str).collect();
        texts.sort_unstable();
        texts.dedup();
        texts.len()
    }

    /// Bulk replace text in all entries
    ///
    /// # Arguments
    /// * `find` - Text to search for, must not be empty
    /// * `replace` - Text to replace with
    pub fn replace_text(&mut self, find: &str, replace: &str) -> Result<ReplaceResult> {
        if find.is_empty() {
            return Err(Error::InvalidArgument("text to find must not be empty".into()));
        }

        let mut result = ReplaceResult::default();
        for (&hash, text) in &mut self.entries {
            let count = text.matches(find).count();
            if count > 0 {
                *text = text.replace(find, replace);
                result.entries_modified += 1;
                result.replacements += count;
                result.modified_hashes.push(hash);
            }
        }
        result.modified_hashes.sort_unstable();
        Ok(result)
    }

    /// Upsert every entry of `other` into this table
    ///
    /// Keys are re-masked to this table's width. Both tables should share
    /// a hash algorithm for the keys to mean the same names.
    ///
    /// # Returns
    /// Number of entries that were added (not updated)
    pub fn merge(&mut self, other: &RstTable) -> usize {
        if other.hash_algorithm() != self.hash_algorithm() {
            tracing::warn!(
                "Merging {} table into {} table; keys may not match",
                other.hash_algorithm(),
                self.hash_algorithm()
            );
        }
        let mut added = 0;
        for (hash, text) in other.iter() {
            if self.insert(hash, text).is_none() {
                added += 1;
            }
        }
        added
    }
}

impl Extend<(u64, String)> for RstTable {
    fn extend<T: IntoIterator<Item = (u64, String)>>(&mut self, iter: T) {
        for (hash, text) in iter {
            self.insert(hash, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_masked() {
        let mut table = RstTable::new(RstVersion::V5Patch1502);
        let hash = table.hash("hello");
        table.insert(hash | (7u64 << 38), "hi");

        assert_eq!(table.get(hash), Some("hi"));
        assert!(table.iter().all(|(h, _)| h & !table.hash_algorithm().mask() == 0));
        assert_eq!(table.get_named("HELLO"), Some("hi"));
    }

    #[test]
    fn test_try_insert_conflict() {
        let mut table = RstTable::new(RstVersion::V3);
        table.try_insert(1, "one").unwrap();
        assert!(matches!(table.try_insert(1, "uno"), Err(Error::KeyConflict(1))));
        assert_eq!(table.get(1), Some("one"));

        assert_eq!(table.insert(1, "uno"), Some("one".to_string()));
        assert_eq!(table.get(1), Some("uno"));
    }

    #[test]
    fn test_insert_named() {
        let mut table = RstTable::new(RstVersion::V4);
        let key = table.insert_named("world", "earth").unwrap();
        assert_eq!(key, 0x7e66ee51ef);
        assert!(matches!(
            table.insert_named("", "x"),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(table.remove_named("WORLD"), Some("earth".to_string()));
        assert!(table.is_empty());
    }

    #[test]
    fn test_sorted_entries() {
        let entries = [(30, "c"), (10, "a"), (20, "b")];
        let table = RstTable::from_entries(RstVersion::V2, entries);
        let hashes: Vec<u64> = table.sorted_entries().iter().map(|&(h, _)| h).collect();
        assert_eq!(hashes, vec![10, 20, 30]);
    }

    #[test]
    fn test_replace_text() {
        let entries = [(1, "red fox, red"), (2, "blue")];
        let mut table = RstTable::from_entries(RstVersion::V5Legacy, entries);
        let result = table.replace_text("red", "grey").unwrap();

        assert_eq!(result.entries_modified, 1);
        assert_eq!(result.replacements, 2);
        assert_eq!(result.modified_hashes, vec![1]);
        assert_eq!(table.get(1), Some("grey fox, grey"));
        assert!(matches!(
            table.replace_text("", "x"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_merge() {
        let mut base = RstTable::from_entries(RstVersion::V4, [(1, "a"), (2, "b")]);
        let patch = RstTable::from_entries(RstVersion::V4, [(2, "B"), (3, "c")]);
        assert_eq!(base.merge(&patch), 1);
        assert_eq!(base.len(), 3);
        assert_eq!(base.get(2), Some("B"));
    }

    #[test]
    fn test_unique_text_count() {
        let table = RstTable::from_entries(RstVersion::V3, [(1, "x"), (2, "x"), (3, "y")]);
        assert_eq!(table.unique_text_count(), 2);
    }
}
