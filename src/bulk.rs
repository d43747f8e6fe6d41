//! One-call helpers for common archive jobs.
//!
//! Each function opens its own [`ArchiveSession`], does one job and closes
//! the session again. Functions without an explicit target derive it from
//! the source path:
//!
//! | Function | Target |
//! |----------|--------|
//! | [`extract`] | parent directory of the archive |
//! | [`compress_file`] | `<file>.zip` next to the file |
//! | [`compress_folder`] | `<folder>.zip` next to the folder |
//! | [`compress_here_list`] | `<parent>/<parent name>.zip` |
//!
//! # Example
//!
//! ```rust,no_run
//! let archive = zipdir::compress_folder("reports")?;
//! zipdir::extract_to(&archive, "restored")?;
//! # Ok::<(), zipdir::Error>(())
//! ```

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::entry::{BufferedItem, BufferedMap};
use crate::session::{ArchiveSession, OpenPolicy};
use crate::{Error, Result};

fn write_archive<F>(zip: &Path, fill: F) -> Result<usize>
where
    F: FnOnce(&mut ArchiveSession) -> Result<usize>,
{
    let mut session = ArchiveSession::new();
    session.open_for_write(zip, OpenPolicy::ForceWrite)?;
    let filled = fill(&mut session);
    let closed = session.close();
    let added = filled?;
    closed?;
    Ok(added)
}

fn archive_name(path: &Path) -> Result<OsString> {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .ok_or_else(|| Error::open_failed(path, "path has no file name"))?;
    name.push(".zip");
    Ok(name)
}

fn sibling_archive(path: &Path) -> Result<PathBuf> {
    let path = std::path::absolute(path)?;
    let name = archive_name(&path)?;
    Ok(path.with_file_name(name))
}

/// Extracts the archive at `zip` into its parent directory.
///
/// Returns the number of entries extracted.
pub fn extract(zip: impl AsRef<Path>) -> Result<usize> {
    ArchiveSession::open(zip)?.extract_all()
}

/// Extracts the archive at `zip` into `output`, creating it if missing.
pub fn extract_to(zip: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<usize> {
    let output = output.as_ref();
    let mut session = ArchiveSession::open(zip)?;
    fs::create_dir_all(output)?;
    session.set_output_folder(Some(output));
    session.extract_all()
}

/// Compresses one file into `<file>.zip` and returns the archive path.
pub fn compress_file(source: impl AsRef<Path>) -> Result<PathBuf> {
    let source = source.as_ref();
    let zip = sibling_archive(source)?;
    compress_file_to(source, &zip)?;
    Ok(zip)
}

/// Compresses one file into `zip`, stored under its own file name.
pub fn compress_file_to(source: impl AsRef<Path>, zip: impl AsRef<Path>) -> Result<()> {
    let source = source.as_ref();
    if !source.is_file() {
        return Err(Error::open_failed(source, "not a file"));
    }
    write_archive(zip.as_ref(), |session| session.add_path(source, None))?;
    Ok(())
}

/// Compresses a folder tree into a sibling `<folder>.zip` and returns the
/// archive path.
pub fn compress_folder(source: impl AsRef<Path>) -> Result<PathBuf> {
    let source = source.as_ref();
    let zip = sibling_archive(source)?;
    compress_folder_to(source, &zip)?;
    Ok(zip)
}

/// Compresses a folder tree into `zip` and returns the number of entries.
///
/// The folder itself becomes the top-level folder entry.
pub fn compress_folder_to(source: impl AsRef<Path>, zip: impl AsRef<Path>) -> Result<usize> {
    let source = source.as_ref();
    if !source.is_dir() {
        return Err(Error::open_failed(source, "not a folder"));
    }
    write_archive(zip.as_ref(), |session| session.add_path(source, None))
}

/// Compresses a file or a folder next to itself and returns the archive path.
pub fn compress_here(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if path.is_dir() {
        compress_folder(path)
    } else {
        compress_file(path)
    }
}

/// Compresses sibling paths into `<parent>/<parent name>.zip` and returns the
/// archive path.
pub fn compress_here_list<P: AsRef<Path>>(paths: &[P]) -> Result<PathBuf> {
    let first = paths
        .first()
        .ok_or_else(|| Error::NoData("no paths to compress".into()))?;
    let first = std::path::absolute(first.as_ref())?;
    let parent = first
        .parent()
        .ok_or_else(|| Error::open_failed(&first, "path has no parent folder"))?;
    let zip = parent.join(archive_name(parent)?);

    compress_list(paths, &zip)?;
    Ok(zip)
}

/// Compresses the given files and folders into `zip`.
///
/// All paths must live in the same folder; each is stored at the archive
/// root under its own name. Missing paths and symbolic links are skipped.
/// Returns the number of entries added.
pub fn compress_list<P: AsRef<Path>>(paths: &[P], zip: impl AsRef<Path>) -> Result<usize> {
    if paths.is_empty() {
        return Err(Error::NoData("no paths to compress".into()));
    }
    let zip = std::path::absolute(zip.as_ref())?;

    let mut parent: Option<PathBuf> = None;
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let path = std::path::absolute(path.as_ref())?;
        let this_parent = path.parent().map(Path::to_path_buf);
        match (&parent, &this_parent) {
            (None, _) => parent = this_parent,
            (Some(expected), Some(actual)) if expected == actual => {}
            _ => {
                return Err(Error::open_failed(
                    &path,
                    "not in the same folder as the other paths",
                ));
            }
        }

        match fs::symlink_metadata(&path) {
            Err(_) => log::warn!("Skipping missing path: {}", path.display()),
            Ok(meta) if meta.file_type().is_symlink() => {
                log::warn!("Skipping symlink: {}", path.display());
            }
            Ok(_) if path == zip => log::warn!("Skipping target archive: {}", path.display()),
            Ok(_) => sources.push(path),
        }
    }

    if sources.is_empty() {
        return Err(Error::NoData("none of the paths exist".into()));
    }
    write_archive(&zip, |session| session.add_paths(&sources))
}

/// Writes every `(name, bytes)` pair of `map` as a file entry into `zip`.
pub fn compress_buf(map: &BufferedMap, zip: impl AsRef<Path>) -> Result<usize> {
    if map.is_empty() {
        return Err(Error::NoData("no buffers to compress".into()));
    }
    let items: Vec<BufferedItem> = map
        .iter()
        .map(|(name, data)| BufferedItem::file(name.as_str(), data.as_slice()))
        .collect();
    write_archive(zip.as_ref(), |session| session.add_items(&items))
}

/// Writes `data` as a single entry named `name` into `zip`.
pub fn compress_bytes(data: &[u8], name: &str, zip: impl AsRef<Path>) -> Result<()> {
    write_archive(zip.as_ref(), |session| {
        session.add_item(&BufferedItem::file(name, data))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_archive_name() {
        let tmp = tempfile::tempdir().unwrap();
        let zip = sibling_archive(&tmp.path().join("photos")).unwrap();
        assert_eq!(zip.file_name().unwrap(), "photos.zip");
        let zip = sibling_archive(&tmp.path().join("a.txt")).unwrap();
        assert_eq!(zip.file_name().unwrap(), "a.txt.zip");
    }

    #[test]
    fn test_compress_list_rejects_mixed_parents() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("a"), b"a").unwrap();
        fs::write(tmp.path().join("sub/b"), b"b").unwrap();

        let paths = [tmp.path().join("a"), tmp.path().join("sub/b")];
        let err = compress_list(&paths, tmp.path().join("out.zip")).unwrap_err();
        assert!(matches!(err, Error::OpenFailed { ref path, .. } if path.ends_with("sub/b")));
    }

    #[test]
    fn test_compress_list_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let none: [PathBuf; 0] = [];
        assert!(matches!(
            compress_list(&none, tmp.path().join("x.zip")).unwrap_err(),
            Error::NoData(_)
        ));
    }

    #[test]
    fn test_compress_list_only_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = [tmp.path().join("ghost")];
        assert!(matches!(
            compress_list(&paths, tmp.path().join("x.zip")).unwrap_err(),
            Error::NoData(_)
        ));
    }

    #[test]
    fn test_compress_buf_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            compress_buf(&BufferedMap::new(), tmp.path().join("x.zip")).unwrap_err(),
            Error::NoData(_)
        ));
    }
}
