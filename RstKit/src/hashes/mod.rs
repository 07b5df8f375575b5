//! Hash name lists
//!
//! Resolves string table keys back to readable entry names. Names are
//! collected with [`HashNamesBuilder`] from hash list files, then frozen
//! into a [`HashNames`] lookup that holds one key map per hash algorithm.
//! The frozen lookup is immutable and can be shared across threads.
//!
//! Hash list lines are either `<hex> <name>` or just `<name>`. The hex
//! column is ignored: names are re-hashed for every algorithm so a single
//! list works with every table version.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::Result;
use crate::formats::rst::HashAlgorithm;

/// Name of the hash list directory looked up next to the executable
pub const HASHES_DIR_NAME: &str = "hashes";

/// `hashes/` next to the running executable, if it exists
#[must_use]
pub fn default_hashes_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?.join(HASHES_DIR_NAME);
    dir.is_dir().then_some(dir)
}

/// Extract the entry name from a hash list line
fn parse_line(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    match line.split_once(char::is_whitespace) {
        Some((hex, name)) if u64::from_str_radix(hex, 16).is_ok() => {
            let name = name.trim();
            (!name.is_empty()).then_some(name)
        }
        _ => Some(line),
    }
}

/// Collects names before freezing them into a [`HashNames`]
#[derive(Debug, Clone, Default)]
pub struct HashNamesBuilder {
    names: Vec<String>,
}

impl HashNamesBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single name. Empty names are ignored.
    pub fn insert(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if !name.is_empty() {
            self.names.push(name);
        }
        self
    }

    /// Add every name in a hash list text
    ///
    /// # Returns
    /// Number of names read
    pub fn load_str(&mut self, text: &str) -> usize {
        let before = self.names.len();
        self.names
            .extend(text.lines().filter_map(parse_line).map(str::to_string));
        self.names.len() - before
    }

    /// Add every name in a hash list file
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let count = self.load_str(&text);
        tracing::debug!("Loaded {} names from {}", count, path.display());
        Ok(count)
    }

    /// Add every `*.txt` hash list below `dir`
    ///
    /// Unreadable files are logged and skipped.
    pub fn load_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize> {
        let mut total = 0;
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            let is_list = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
            if !is_list {
                continue;
            }
            match self.load_file(path) {
                Ok(count) => total += count,
                Err(e) => {
                    tracing::warn!("Skipping hash list {}: {}", path.display(), e);
                }
            }
        }
        Ok(total)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Freeze the collected names into per-algorithm lookups
    #[must_use]
    pub fn build(mut self) -> HashNames {
        self.names.sort_unstable();
        self.names.dedup();
        let names = self.names;

        let maps: HashMap<HashAlgorithm, HashMap<u64, usize>> = HashAlgorithm::ALL
            .par_iter()
            .map(|&algorithm| {
                let mut map = HashMap::with_capacity(names.len());
                for (index, name) in names.iter().enumerate() {
                    map.entry(algorithm.hash(name)).or_insert(index);
                }
                if map.len() < names.len() {
                    tracing::debug!(
                        "{} name collisions under {}",
                        names.len() - map.len(),
                        algorithm
                    );
                }
                (algorithm, map)
            })
            .collect();

        tracing::info!("Hash names ready: {} names", names.len());
        HashNames { names, maps }
    }
}

/// Frozen hash → name lookup
#[derive(Debug, Clone, Default)]
pub struct HashNames {
    names: Vec<String>,
    maps: HashMap<HashAlgorithm, HashMap<u64, usize>>,
}

impl HashNames {
    #[must_use]
    pub fn builder() -> HashNamesBuilder {
        HashNamesBuilder::new()
    }

    /// Lookup without any names
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every hash list in `dir` and freeze the result
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut builder = HashNamesBuilder::new();
        builder.load_dir(dir)?;
        Ok(builder.build())
    }

    /// Name for a key produced by `algorithm`
    #[must_use]
    pub fn resolve(&self, hash: u64, algorithm: HashAlgorithm) -> Option<&str> {
        let index = *self.maps.get(&algorithm)?.get(&(hash & algorithm.mask()))?;
        self.names.get(index).map(String::as_str)
    }

    /// Number of distinct names
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for HashNames {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut builder = HashNamesBuilder::new();
        for name in iter {
            builder.insert(name);
        }
        builder.build()
    }
}
