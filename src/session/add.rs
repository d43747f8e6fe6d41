//! Appending entries to a session opened for writing.
//!
//! Every insertion goes through one private chokepoint, which checks the
//! name against the directory, appends to the container and records the
//! index the container assigned. Nothing else touches the directory while
//! writing.

use std::fs;
use std::path::{Path, PathBuf};

use super::{ArchiveSession, Mode};
use crate::archive_path;
use crate::entry::BufferedItem;
use crate::timestamp::Timestamp;
use crate::tree::FolderWalk;
use crate::{Error, Result};

/// What an insertion writes.
enum Payload<'a> {
    /// Contents of a file on disk.
    File(&'a Path),
    /// Bytes held in memory.
    Bytes(&'a [u8], Option<Timestamp>),
}

fn default_entry_name(source: &Path) -> Result<String> {
    let absolute;
    let path = if source.file_name().is_some() {
        source
    } else {
        absolute = std::path::absolute(source)?;
        absolute.as_path()
    };
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::InvalidEntryName(format!("cannot derive a name from {}", source.display()))
        })
}

impl ArchiveSession {
    /// Adds a file or a folder tree from disk and returns the number of
    /// entries added.
    ///
    /// `entry_name` defaults to the source's own file name at the archive
    /// root. A file becomes one entry. A folder becomes a folder marker
    /// followed by a depth-first walk of its contents; names that are already
    /// present are skipped, and the add fails with
    /// [`Error::DuplicateEntry`] only if nothing new was added.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use zipdir::{ArchiveSession, OpenPolicy};
    ///
    /// let mut session = ArchiveSession::new();
    /// session.open_for_write("backup.zip", OpenPolicy::ForceWrite)?;
    /// let added = session.add_path("documents", None)?;
    /// println!("{added} entries");
    /// session.add_path("notes.txt", Some("extra/notes.txt"))?;
    /// session.close()?;
    /// # Ok::<(), zipdir::Error>(())
    /// ```
    pub fn add_path(&mut self, source: impl AsRef<Path>, entry_name: Option<&str>) -> Result<usize> {
        let source = source.as_ref();
        self.ensure_mode(Mode::Writing, "add_path")?;

        let result = self.add_path_inner(source, entry_name);
        if let Err(e) = &result {
            log::warn!("add_path {}: {}", source.display(), e);
        }
        result
    }

    fn add_path_inner(&mut self, source: &Path, entry_name: Option<&str>) -> Result<usize> {
        let name = match entry_name {
            Some(name) => name.to_string(),
            None => default_entry_name(source)?,
        };

        let metadata = fs::metadata(source)?;
        if !metadata.is_dir() {
            if archive_path::is_folder_name(&name) {
                return Err(Error::InvalidEntryName(format!(
                    "'{}' names a folder but {} is a file",
                    name,
                    source.display()
                )));
            }
            self.insert(&name, Payload::File(source))?;
            return Ok(1);
        }

        let root = archive_path::to_folder_name(&name);
        archive_path::validate_entry_name(&root)?;

        let mut added = 0;
        for (position, item) in FolderWalk::new(source, &root).enumerate() {
            let item = item.map_err(|e| Error::EntryFailed {
                operation: "add_path",
                index: position,
                name: root.clone(),
                source: Box::new(e),
            })?;

            let payload = if item.is_folder() {
                let modified = fs::metadata(&item.fs_path)
                    .map(|m| Timestamp::from_metadata(&m))
                    .ok();
                Payload::Bytes(&[], modified)
            } else {
                Payload::File(&item.fs_path)
            };

            match self.insert(&item.name, payload) {
                Ok(_) => added += 1,
                Err(e) if e.is_duplicate() => {
                    log::warn!("Skipping existing entry: {}", item.name);
                }
                Err(e) => {
                    return Err(Error::EntryFailed {
                        operation: "add_path",
                        index: position,
                        name: item.name,
                        source: Box::new(e),
                    });
                }
            }
        }

        if added == 0 {
            return Err(Error::DuplicateEntry { name: root });
        }
        Ok(added)
    }

    /// Adds an in-memory item and returns its index.
    ///
    /// A separator-terminated name writes a zero-length folder marker; a
    /// folder item carrying data is refused.
    pub fn add_item(&mut self, item: &BufferedItem) -> Result<usize> {
        self.ensure_mode(Mode::Writing, "add_item")?;

        let result = if item.is_folder() && !item.data().is_empty() {
            Err(Error::InvalidEntryName(format!(
                "folder '{}' cannot carry data",
                item.name
            )))
        } else {
            self.insert(&item.name, Payload::Bytes(item.data(), item.modified))
        };

        if let Err(e) = &result {
            log::warn!("add_item: {}", e);
        }
        result
    }

    /// Adds `items` in order and returns the number added.
    ///
    /// Stops at the first failure. Items written before it stay in the
    /// archive.
    pub fn add_items(&mut self, items: &[BufferedItem]) -> Result<usize> {
        self.ensure_mode(Mode::Writing, "add_items")?;
        if items.is_empty() {
            let err = Error::NoData("no items to add".into());
            log::warn!("add_items: {}", err);
            return Err(err);
        }

        for (position, item) in items.iter().enumerate() {
            if let Err(e) = self.add_item(item) {
                return Err(Error::EntryFailed {
                    operation: "add_items",
                    index: position,
                    name: item.name.clone(),
                    source: Box::new(e),
                });
            }
        }
        Ok(items.len())
    }

    /// Adds every path in `sources` at the archive root, skipping names that
    /// already exist. Returns the number of entries added.
    pub(crate) fn add_paths(&mut self, sources: &[PathBuf]) -> Result<usize> {
        let mut added = 0;
        for source in sources {
            match self.add_path(source, None) {
                Ok(n) => added += n,
                Err(e) if e.is_duplicate() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(added)
    }

    fn insert(&mut self, name: &str, payload: Payload<'_>) -> Result<usize> {
        archive_path::validate_entry_name(name)?;
        if self.directory.contains(name) {
            return Err(Error::DuplicateEntry {
                name: name.to_string(),
            });
        }

        let threshold = self.options.store_threshold;
        let verbose = self.options.verbose;
        let container = self.writing_container("add")?;
        let index = match payload {
            Payload::File(path) => container.append_file(path, name, threshold)?,
            Payload::Bytes(data, modified) => {
                container.append_bytes(name, data, modified, threshold)?
            }
        };

        if verbose {
            log::info!("Adding: {}", name);
        }
        self.directory.record(name, index)
    }
}
