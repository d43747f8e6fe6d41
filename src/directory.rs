//! Ordered name → index mapping mirroring a container's entries.
//!
//! The ZIP format does not deduplicate names, so the directory is the single
//! authority on what a session may append. Indices are assigned in insertion
//! order, equal the directory size at the moment of insertion, and are never
//! reused.

use std::collections::HashMap;

use crate::archive_path;
use crate::format::container::Container;
use crate::{Error, Result};

/// In-memory directory of the entries of one container.
#[derive(Debug, Clone, Default)]
pub struct EntryDirectory {
    /// Entry names by index.
    names: Vec<String>,
    /// First index of each name.
    by_name: HashMap<String, usize>,
}

impl EntryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no entries are recorded.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.names.clear();
        self.by_name.clear();
    }

    /// Name of the entry at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Returns `true` if an entry named exactly `name` is recorded.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Iterates over `(index, name)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }

    /// Index of the entry named exactly `name`.
    ///
    /// If a read container holds the same name more than once, the first
    /// occurrence wins.
    pub fn lookup_exact(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Index of the first file entry whose final component equals `name`.
    ///
    /// Only applies when `name` has no separator. Folder markers never match.
    pub fn lookup_by_basename(&self, name: &str) -> Option<usize> {
        if name.is_empty() || archive_path::has_separator(name) {
            return None;
        }
        self.iter()
            .find(|(_, entry)| {
                archive_path::is_file_name(entry) && archive_path::file_name(entry) == name
            })
            .map(|(index, _)| index)
    }

    /// Exact lookup, then basename fallback for separator-free names.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.lookup_exact(name)
            .or_else(|| self.lookup_by_basename(name))
    }

    /// Records `name` at `index`.
    ///
    /// `index` must equal the current directory size; anything else means the
    /// container and the directory disagree and is refused.
    pub fn record(&mut self, name: impl Into<String>, index: usize) -> Result<usize> {
        let expected = self.names.len();
        if index != expected {
            return Err(Error::DirectoryOutOfSync {
                expected,
                actual: index,
            });
        }

        let name = name.into();
        self.by_name.entry(name.clone()).or_insert(index);
        self.names.push(name);
        Ok(index)
    }

    /// Clears the directory and repopulates it from `container` indices
    /// `0..count`.
    pub fn rebuild_from_container(&mut self, container: &mut Container) -> Result<()> {
        self.clear();
        let count = container.count();
        self.names.reserve(count);
        for index in 0..count {
            let entry = container.stat(index)?;
            if self.contains(&entry.name) {
                log::warn!(
                    "Duplicate entry name '{}' at index {} (first at {})",
                    entry.name,
                    index,
                    self.by_name[&entry.name]
                );
            }
            self.record(entry.name, index)?;
        }
        Ok(())
    }
}
