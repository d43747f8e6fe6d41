//! Entry descriptors and in-memory items.

use std::collections::BTreeMap;

use crate::archive_path;
use crate::timestamp::Timestamp;

/// Metadata of one entry as reported by the container.
///
/// Entries are not stored by the session; they are produced on demand by
/// [`ArchiveSession::entry`](crate::ArchiveSession::entry).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Entry {
    /// Position of the entry in the container.
    pub index: usize,
    /// Slash-separated name; a trailing separator marks a folder.
    pub name: String,
    /// Stored (possibly compressed) size in bytes.
    pub compressed_size: u64,
    /// Uncompressed size in bytes.
    pub uncompressed_size: u64,
    /// Last modification time, if recorded.
    pub modified: Option<Timestamp>,
}

impl Entry {
    /// Returns `true` if this entry is a folder marker.
    pub fn is_folder(&self) -> bool {
        archive_path::is_folder_name(&self.name)
    }

    /// Returns `true` if this entry holds file data.
    pub fn is_file(&self) -> bool {
        archive_path::is_file_name(&self.name)
    }

    /// Returns the final path component of the name.
    pub fn file_name(&self) -> &str {
        archive_path::file_name(&self.name)
    }
}

/// A file or folder held in memory, ready to be added to or just extracted
/// from an archive.
///
/// The item is a folder iff its name ends with the separator; folders never
/// carry a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedItem {
    /// Path inside the archive.
    pub name: String,
    /// Uncompressed data; `None` for folder markers.
    pub payload: Option<Vec<u8>>,
    /// Last modification time; `None` means "now" when written.
    pub modified: Option<Timestamp>,
}

impl BufferedItem {
    /// Creates a file item.
    pub fn file(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            payload: Some(data.into()),
            modified: None,
        }
    }

    /// Creates a folder marker. The separator is appended if missing.
    pub fn folder(name: impl AsRef<str>) -> Self {
        Self {
            name: archive_path::to_folder_name(name.as_ref()),
            payload: None,
            modified: None,
        }
    }

    /// Sets the modification time.
    pub fn modified(mut self, time: Timestamp) -> Self {
        self.modified = Some(time);
        self
    }

    /// Returns `true` if this item is a folder marker.
    pub fn is_folder(&self) -> bool {
        archive_path::is_folder_name(&self.name)
    }

    /// Payload bytes; empty for folders.
    pub fn data(&self) -> &[u8] {
        self.payload.as_deref().unwrap_or(&[])
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.data().len()
    }
}

/// Extracted files keyed by entry name, in name order.
pub type BufferedMap = BTreeMap<String, Vec<u8>>;
