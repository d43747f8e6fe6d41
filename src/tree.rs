//! Filesystem folder walks producing archive entry names.
//!
//! [`FolderWalk`] turns a directory tree into `(entry name, source path)`
//! pairs. The walk is depth-first with siblings sorted by file name, so the
//! output is deterministic and every folder is emitted before its contents.
//! Symbolic links below the walked folder are skipped; a symlinked root is
//! followed and still yields its folder marker.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::archive_path;
use crate::{Error, Result};

/// One item of a folder walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    /// Entry name inside the archive; folders end with the separator.
    pub name: String,
    /// Path of the source on disk.
    pub fs_path: PathBuf,
}

impl TreeItem {
    /// Returns `true` if the item is a folder marker.
    pub fn is_folder(&self) -> bool {
        archive_path::is_folder_name(&self.name)
    }
}

/// Depth-first walk over a folder, starting with the folder itself.
///
/// Each descendant's name is its path relative to the walked folder, joined
/// onto the folder's own entry name.
///
/// # Example
///
/// ```rust,no_run
/// use zipdir::tree::FolderWalk;
///
/// for item in FolderWalk::new("photos", "holiday") {
///     let item = item?;
///     println!("{} <- {}", item.name, item.fs_path.display());
/// }
/// # Ok::<(), zipdir::Error>(())
/// ```
pub struct FolderWalk {
    root: PathBuf,
    prefix: String,
    inner: walkdir::IntoIter,
}

impl FolderWalk {
    /// Walks `root`, naming its entries below `entry_name`.
    pub fn new(root: impl AsRef<Path>, entry_name: &str) -> Self {
        let root = root.as_ref().to_path_buf();
        let inner = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Self {
            root,
            prefix: archive_path::to_folder_name(entry_name),
            inner,
        }
    }
}

impl Iterator for FolderWalk {
    type Item = Result<TreeItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(Error::Io(e.into()))),
            };

            if entry.depth() > 0 && entry.path_is_symlink() {
                log::debug!("Skipping symlink: {}", entry.path().display());
                continue;
            }

            let Some(rel) = archive_path::relative_name(&self.root, entry.path()) else {
                log::warn!("Skipping non UTF-8 path: {}", entry.path().display());
                continue;
            };

            let is_dir = entry.file_type().is_dir();
            let name = if rel.is_empty() {
                self.prefix.clone()
            } else if is_dir {
                archive_path::to_folder_name(&archive_path::join(&self.prefix, &rel))
            } else {
                archive_path::join(&self.prefix, &rel)
            };

            return Some(Ok(TreeItem {
                name,
                fs_path: entry.into_path(),
            }));
        }
    }
}
