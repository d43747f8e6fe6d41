//! Session configuration.

use crate::format::container::DEFAULT_STORE_THRESHOLD;

/// How [`ArchiveSession::open_for_write`](crate::ArchiveSession::open_for_write)
/// treats the target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenPolicy {
    /// Create a new archive if the target is absent, read it if it is a
    /// valid container, fail otherwise.
    #[default]
    Auto,
    /// Read the target; fail unless it is a valid container.
    ForceRead,
    /// Always create a new archive, overwriting any existing target.
    ForceWrite,
}

/// Options controlling an [`ArchiveSession`](crate::ArchiveSession).
///
/// # Example
///
/// ```rust
/// use zipdir::SessionOptions;
///
/// let options = SessionOptions::new()
///     .verbose(false)
///     .store_threshold(128);
/// assert_eq!(options.store_threshold, 128);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Emit a per-item trace (`log::info!`) for adds and extractions.
    pub verbose: bool,
    /// Payloads at or below this many bytes are stored; larger ones deflated.
    pub store_threshold: u64,
    /// Set each extracted file's modification time from the archive.
    pub restore_modified_time: bool,
    /// Refuse to extract entries whose names contain `..` segments or start
    /// with a separator.
    pub strict_paths: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            verbose: true,
            store_threshold: DEFAULT_STORE_THRESHOLD,
            restore_modified_time: true,
            strict_paths: true,
        }
    }
}

impl SessionOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-item trace.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the store/deflate size threshold.
    pub fn store_threshold(mut self, bytes: u64) -> Self {
        self.store_threshold = bytes;
        self
    }

    /// Sets whether extracted files get their archived modification time.
    pub fn restore_modified_time(mut self, restore: bool) -> Self {
        self.restore_modified_time = restore;
        self
    }

    /// Sets path traversal checking on extraction.
    pub fn strict_paths(mut self, strict: bool) -> Self {
        self.strict_paths = strict;
        self
    }
}
