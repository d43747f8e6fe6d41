//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use zipdir::{ArchiveSession, BufferedItem, OpenPolicy, SessionOptions};

/// Options for sessions opened by tests: no per-item trace.
pub fn quiet_options() -> SessionOptions {
    SessionOptions::new().verbose(false)
}

/// Creates a closed session with [`quiet_options`].
pub fn quiet_session() -> ArchiveSession {
    ArchiveSession::with_options(quiet_options())
}

/// Writes an archive at `path` containing `entries` in order.
///
/// Names ending with `/` become folder markers; everything else is a file.
///
/// # Panics
///
/// Panics if the archive cannot be written.
pub fn create_archive(path: &Path, entries: &[(&str, &[u8])]) {
    let mut session = quiet_session();
    session
        .open_for_write(path, OpenPolicy::ForceWrite)
        .expect("Failed to open archive for writing");
    for (name, data) in entries {
        let item = if name.ends_with('/') {
            BufferedItem::folder(name)
        } else {
            BufferedItem::file(*name, *data)
        };
        session
            .add_item(&item)
            .unwrap_or_else(|e| panic!("Failed to add '{}': {}", name, e));
    }
    session.close().expect("Failed to finalize archive");
}

/// Opens `path` for reading with [`quiet_options`].
pub fn open_reader(path: &Path) -> ArchiveSession {
    let mut session = quiet_session();
    session
        .open_for_read(path)
        .unwrap_or_else(|e| panic!("Failed to open '{}': {}", path.display(), e));
    session
}

/// Builds a folder tree below `root` from `(relative path, contents)` pairs.
///
/// Paths ending with `/` create empty directories.
pub fn create_tree(root: &Path, files: &[(&str, &[u8])]) -> PathBuf {
    fs::create_dir_all(root).expect("Failed to create tree root");
    for (rel, data) in files {
        let path = root.join(rel.trim_end_matches('/'));
        if rel.ends_with('/') {
            fs::create_dir_all(&path).expect("Failed to create directory");
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("Failed to create parent");
            }
            fs::write(&path, data).expect("Failed to write file");
        }
    }
    root.to_path_buf()
}

/// Entry names of an open session, in index order.
pub fn entry_names(session: &ArchiveSession) -> Vec<String> {
    session.contents().into_iter().map(|(_, name)| name).collect()
}

/// Extracts the error from a Result, panicking if it's Ok.
///
/// # Panics
///
/// Panics if the result is `Ok(_)`.
pub fn expect_err<T, E>(result: Result<T, E>) -> E {
    match result {
        Ok(_) => panic!("Expected error but got Ok"),
        Err(e) => e,
    }
}
