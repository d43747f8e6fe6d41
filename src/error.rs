//! Error types for ZIP archive sessions.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes of a session, its container and its entry directory, along
//! with a convenient [`Result<T>`] type alias.
//!
//! Lookups that may legitimately miss (for example
//! [`ArchiveSession::find_index`](crate::ArchiveSession::find_index)) return
//! `Option` instead of an error. Everything else that can fail returns
//! `Result<T, Error>`.
//!
//! # Example
//!
//! ```rust,no_run
//! use zipdir::{ArchiveSession, BufferedItem, Error, OpenPolicy};
//!
//! fn add_once(session: &mut ArchiveSession, name: &str) -> zipdir::Result<bool> {
//!     match session.add_item(&BufferedItem::file(name, b"data".to_vec())) {
//!         Ok(_) => Ok(true),
//!         Err(Error::DuplicateEntry { .. }) => Ok(false),
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::io;

use crate::session::Mode;

/// The main error type for archive session operations.
///
/// | Category | Variants |
/// |----------|----------|
/// | Open | [`OpenFailed`][Self::OpenFailed] |
/// | Mode | [`ModeMismatch`][Self::ModeMismatch] |
/// | Lookup | [`IndexOutOfRange`][Self::IndexOutOfRange], [`EntryNotFound`][Self::EntryNotFound] |
/// | Insertion | [`DuplicateEntry`][Self::DuplicateEntry], [`InvalidEntryName`][Self::InvalidEntryName] |
/// | I/O | [`Io`][Self::Io], [`Container`][Self::Container] |
/// | Input | [`NoData`][Self::NoData] |
/// | Security | [`PathTraversal`][Self::PathTraversal] |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The ZIP container primitive reported an error (bad framing,
    /// checksum mismatch, unsupported compression, ...).
    #[error("ZIP container error: {0}")]
    Container(#[from] zip::result::ZipError),

    /// The archive could not be opened.
    ///
    /// Returned for missing paths, targets that fail the magic-byte probe,
    /// and targets the container primitive refuses to parse. The one-call
    /// helpers also use it for sources of the wrong kind.
    #[error("Failed to open '{path}': {reason}")]
    OpenFailed {
        /// The path (or `<buffer>` for in-memory sources) that was being opened.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// The operation requires the session to be in another mode.
    #[error("{operation} requires {required} mode, but the session is {actual}")]
    ModeMismatch {
        /// The operation that was attempted.
        operation: &'static str,
        /// The mode the operation needs.
        required: Mode,
        /// The mode the session was in.
        actual: Mode,
    },

    /// An entry index does not name an entry.
    #[error("Entry index {index} is out of range (archive has {count} entries)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of entries in the directory.
        count: usize,
    },

    /// No entry with the given name exists.
    #[error("Entry not found: {name}")]
    EntryNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// An entry with this name is already present.
    ///
    /// Adds never overwrite: the first writer wins.
    #[error("Entry already exists: {name}")]
    DuplicateEntry {
        /// The conflicting name.
        name: String,
    },

    /// A folder operation was given the index of a file entry.
    #[error("Entry {index} is not a folder: {name}")]
    NotAFolder {
        /// The entry index.
        index: usize,
        /// The entry name.
        name: String,
    },

    /// The entry name cannot be stored in an archive.
    #[error("Invalid entry name: {0}")]
    InvalidEntryName(String),

    /// Nothing to operate on: empty input, no sources, empty archive or no
    /// output folder.
    #[error("No data: {0}")]
    NoData(String),

    /// An entry name would escape the extraction folder.
    #[error("Path traversal detected in entry {index}: {name}")]
    PathTraversal {
        /// The entry index.
        index: usize,
        /// The offending entry name.
        name: String,
    },

    /// The entry directory and the container disagree about the next index.
    #[error("Entry directory out of sync: expected index {expected}, container assigned {actual}")]
    DirectoryOutOfSync {
        /// Index the directory expected (its current size).
        expected: usize,
        /// Index reported by the caller.
        actual: usize,
    },

    /// A multi-item operation halted on one of its items.
    ///
    /// Items processed before the failing one are not rolled back.
    #[error("{operation} failed at entry {index} ({name}): {source}")]
    EntryFailed {
        /// The multi-item operation.
        operation: &'static str,
        /// Position of the failing item.
        index: usize,
        /// Name of the failing item.
        name: String,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Returns `true` if the error (or the item error it wraps) is a
    /// rejected duplicate add.
    pub fn is_duplicate(&self) -> bool {
        match self {
            Error::DuplicateEntry { .. } => true,
            Error::EntryFailed { source, .. } => source.is_duplicate(),
            _ => false,
        }
    }

    /// Returns `true` for lookup misses.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::EntryNotFound { .. } | Error::IndexOutOfRange { .. }
        )
    }

    /// Returns `true` if the session was in the wrong mode.
    pub fn is_mode_mismatch(&self) -> bool {
        matches!(self, Error::ModeMismatch { .. })
    }

    pub(crate) fn open_failed(path: impl AsRef<std::path::Path>, reason: impl Into<String>) -> Self {
        Error::OpenFailed {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for archive session operations.
pub type Result<T> = std::result::Result<T, Error>;
