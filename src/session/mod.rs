//! Archive sessions.
//!
//! An [`ArchiveSession`] owns at most one open container together with the
//! [`EntryDirectory`] mirroring it. The session is either closed, reading or
//! writing; the mode is derived from the handle it holds, so opening a new
//! target always releases the previous handle first.
//!
//! # Example
//!
//! ```rust,no_run
//! use zipdir::{ArchiveSession, BufferedItem, OpenPolicy};
//!
//! let mut session = ArchiveSession::new();
//! session.open_for_write("notes.zip", OpenPolicy::ForceWrite)?;
//! session.add_item(&BufferedItem::file("a.txt", b"hello".to_vec()))?;
//! session.close()?;
//!
//! session.open_for_read("notes.zip")?;
//! let index = session.find_index("a.txt").unwrap();
//! assert_eq!(session.extract_data(index)?, b"hello");
//! # Ok::<(), zipdir::Error>(())
//! ```

mod add;
mod extraction;
mod options;

use std::fmt;
use std::path::{Path, PathBuf};

pub use options::{OpenPolicy, SessionOptions};

use crate::directory::EntryDirectory;
use crate::entry::Entry;
use crate::format::container::Container;
use crate::format::detect;
use crate::timestamp::Timestamp;
use crate::{Error, Result};

/// The state of an [`ArchiveSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// No container is open.
    #[default]
    Closed,
    /// A container is open for extraction.
    Reading,
    /// A container is open for appending entries.
    Writing,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Closed => "closed",
            Mode::Reading => "reading",
            Mode::Writing => "writing",
        })
    }
}

/// A stateful coordinator of one open ZIP container.
///
/// Dropping a session closes it; a writer is finalized on drop, with any
/// failure logged. Call [`close`](Self::close) to observe that failure.
pub struct ArchiveSession {
    container: Option<Container>,
    directory: EntryDirectory,
    source_path: Option<PathBuf>,
    output_folder: Option<PathBuf>,
    options: SessionOptions,
    scratch: Vec<u8>,
}

impl Default for ArchiveSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ArchiveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveSession")
            .field("mode", &self.mode())
            .field("path", &self.source_path)
            .field("output_folder", &self.output_folder)
            .field("count", &self.directory.len())
            .finish()
    }
}

impl ArchiveSession {
    /// Creates a closed session with default options.
    pub fn new() -> Self {
        Self::with_options(SessionOptions::default())
    }

    /// Creates a closed session with the given options.
    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            container: None,
            directory: EntryDirectory::new(),
            source_path: None,
            output_folder: None,
            options,
            scratch: Vec::new(),
        }
    }

    /// Opens the archive at `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut session = Self::new();
        session.open_for_read(path)?;
        Ok(session)
    }

    /// Opens an in-memory archive for reading.
    pub fn from_buffer(data: Vec<u8>) -> Result<Self> {
        let mut session = Self::new();
        session.open_buffer(data)?;
        Ok(session)
    }

    /// Opens the archive at `path` for reading.
    ///
    /// Any previously open container is closed first. On success the output
    /// folder defaults to the archive's parent directory.
    pub fn open_for_read(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = std::path::absolute(path.as_ref())?;
        self.close()?;

        if !detect::is_zip_file(&path) {
            let err = Error::open_failed(&path, "not a ZIP archive");
            log::warn!("open_for_read: {}", err);
            return Err(err);
        }

        let container = Container::open_reader(&path).inspect_err(|e| {
            log::warn!("open_for_read: {}", e);
        })?;
        self.attach(container, Some(path))?;
        Ok(())
    }

    /// Opens `path` as a write target, following `policy`.
    ///
    /// Returns the mode the session ended up in. A writer always starts with
    /// an empty directory and truncates any existing file.
    pub fn open_for_write(&mut self, path: impl AsRef<Path>, policy: OpenPolicy) -> Result<Mode> {
        let path = std::path::absolute(path.as_ref())?;
        self.close()?;

        let read = match policy {
            OpenPolicy::ForceWrite => false,
            OpenPolicy::ForceRead => true,
            OpenPolicy::Auto => path.exists(),
        };

        let container = if read {
            if !detect::is_zip_file(&path) {
                let err = Error::open_failed(&path, "target exists but is not a ZIP archive");
                log::warn!("open_for_write: {}", err);
                return Err(err);
            }
            Container::open_reader(&path)
        } else {
            Container::open_writer(&path)
        }
        .inspect_err(|e| log::warn!("open_for_write: {}", e))?;

        self.attach(container, Some(path))?;
        Ok(self.mode())
    }

    /// Opens an in-memory archive for reading.
    ///
    /// The output folder stays unset until [`set_output_folder`](Self::set_output_folder)
    /// provides one.
    pub fn open_buffer(&mut self, data: Vec<u8>) -> Result<()> {
        self.close()?;
        if !detect::is_archive(&data) {
            let err = Error::open_failed("<buffer>", "not a ZIP archive");
            log::warn!("open_buffer: {}", err);
            return Err(err);
        }
        let container = Container::open_buffer(data).inspect_err(|e| {
            log::warn!("open_buffer: {}", e);
        })?;
        self.attach(container, None)
    }

    fn attach(&mut self, mut container: Container, path: Option<PathBuf>) -> Result<()> {
        if let Err(e) = self.directory.rebuild_from_container(&mut container) {
            log::warn!("Failed to read entry directory: {}", e);
            self.directory.clear();
            return Err(e);
        }

        log::debug!(
            "Opened {} for {} ({} entries)",
            path.as_deref()
                .map_or_else(|| "<buffer>".to_string(), |p| p.display().to_string()),
            container.mode(),
            self.directory.len()
        );

        self.output_folder = path.as_deref().and_then(Path::parent).map(Path::to_path_buf);
        self.source_path = path;
        self.container = Some(container);
        Ok(())
    }

    /// Closes the session.
    ///
    /// A writer is finalized first. The handle, path, directory and output
    /// folder are released even if finalizing fails. Closing a closed session
    /// does nothing.
    pub fn close(&mut self) -> Result<()> {
        let Some(container) = self.container.take() else {
            return Ok(());
        };

        let result = container.finalize_and_close();
        log::debug!(
            "Closed {}",
            self.source_path
                .as_deref()
                .map_or_else(|| "<buffer>".to_string(), |p| p.display().to_string())
        );

        self.source_path = None;
        self.output_folder = None;
        self.directory.clear();
        self.release_scratch();

        result.inspect_err(|e| log::warn!("close: {}", e))
    }

    /// The current mode.
    pub fn mode(&self) -> Mode {
        self.container.as_ref().map_or(Mode::Closed, Container::mode)
    }

    /// Returns `true` unless the session is closed.
    pub fn is_open(&self) -> bool {
        self.container.is_some()
    }

    /// Absolute path of the open archive, if it was opened from disk.
    pub fn path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Folder that extraction writes into.
    pub fn output_folder(&self) -> Option<&Path> {
        self.output_folder.as_deref()
    }

    /// Sets the extraction folder; `None` restores the archive's parent directory.
    pub fn set_output_folder(&mut self, folder: Option<impl AsRef<Path>>) {
        self.output_folder = match folder {
            Some(folder) => Some(folder.as_ref().to_path_buf()),
            None => self
                .source_path
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf),
        };
    }

    /// The session options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Turns the per-item trace on or off.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.options.verbose = verbose;
    }

    /// Number of entries in the directory.
    pub fn count(&self) -> usize {
        self.directory.len()
    }

    /// The entry directory.
    pub fn directory(&self) -> &EntryDirectory {
        &self.directory
    }

    /// `(index, name)` pairs in insertion order.
    pub fn contents(&self) -> Vec<(usize, String)> {
        self.directory
            .iter()
            .map(|(index, name)| (index, name.to_string()))
            .collect()
    }

    /// Looks up `name`: exact match first, then (for names without a
    /// separator) the first file entry with that final component.
    pub fn find_index(&self, name: &str) -> Option<usize> {
        self.directory.find(name)
    }

    /// Name of the entry at `index`.
    pub fn name(&self, index: usize) -> Result<&str> {
        let count = self.directory.len();
        self.directory
            .name(index)
            .ok_or(Error::IndexOutOfRange { index, count })
    }

    /// Returns `true` if the entry at `index` is a folder marker.
    pub fn is_folder(&self, index: usize) -> Result<bool> {
        self.name(index).map(crate::archive_path::is_folder_name)
    }

    /// Returns `true` if the entry at `index` is a file.
    pub fn is_file(&self, index: usize) -> Result<bool> {
        self.name(index).map(crate::archive_path::is_file_name)
    }

    /// Metadata of the entry at `index`. Requires reading mode.
    pub fn entry(&mut self, index: usize) -> Result<Entry> {
        let container = self.reading_container("entry")?;
        container
            .stat(index)
            .inspect_err(|e| log::warn!("entry: {}", e))
    }

    /// Stored size of the entry at `index`.
    pub fn compressed_size(&mut self, index: usize) -> Result<u64> {
        self.entry(index).map(|e| e.compressed_size)
    }

    /// Decompressed size of the entry at `index`.
    pub fn uncompressed_size(&mut self, index: usize) -> Result<u64> {
        self.entry(index).map(|e| e.uncompressed_size)
    }

    /// Modification time of the entry at `index`, if recorded.
    pub fn last_modified(&mut self, index: usize) -> Result<Option<Timestamp>> {
        self.entry(index).map(|e| e.modified)
    }

    /// Sum of the decompressed sizes of all entries.
    pub fn total_uncompressed_size(&mut self) -> Result<u64> {
        let count = self.directory.len();
        let container = self.reading_container("total_uncompressed_size")?;
        let mut total = 0u64;
        for index in 0..count {
            total = total.saturating_add(container.stat(index)?.uncompressed_size);
        }
        Ok(total)
    }

    fn ensure_mode(&self, required: Mode, operation: &'static str) -> Result<()> {
        let actual = self.mode();
        if actual == required {
            return Ok(());
        }
        let err = Error::ModeMismatch {
            operation,
            required,
            actual,
        };
        log::warn!("{}", err);
        Err(err)
    }

    fn reading_container(&mut self, operation: &'static str) -> Result<&mut Container> {
        self.ensure_mode(Mode::Reading, operation)?;
        self.container.as_mut().ok_or(Error::ModeMismatch {
            operation,
            required: Mode::Reading,
            actual: Mode::Closed,
        })
    }

    fn writing_container(&mut self, operation: &'static str) -> Result<&mut Container> {
        self.ensure_mode(Mode::Writing, operation)?;
        self.container.as_mut().ok_or(Error::ModeMismatch {
            operation,
            required: Mode::Writing,
            actual: Mode::Closed,
        })
    }
}

impl Drop for ArchiveSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Failed to close archive session on drop: {}", e);
        }
    }
}
