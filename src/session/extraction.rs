//! Extraction from a session opened for reading.

use std::fs;
use std::path::{Path, PathBuf};

use super::{ArchiveSession, Mode};
use crate::archive_path;
use crate::entry::{BufferedItem, BufferedMap};
use crate::{Error, Result};

impl ArchiveSession {
    /// Extracts the entry at `index` into the output folder and returns the
    /// path written.
    ///
    /// With `recreate_path` the entry's full relative path is recreated below
    /// the output folder; otherwise only its final component is used. A
    /// folder entry only ensures the directory exists.
    pub fn extract(&mut self, index: usize, recreate_path: bool) -> Result<PathBuf> {
        self.ensure_mode(Mode::Reading, "extract")?;
        let result = self.extract_inner(index, recreate_path);
        if let Err(e) = &result {
            log::warn!("extract: {}", e);
        }
        result
    }

    fn extract_inner(&mut self, index: usize, recreate_path: bool) -> Result<PathBuf> {
        let name = self.name(index)?.to_string();
        let root = self.require_output_folder()?;

        let relative = if recreate_path {
            name.as_str()
        } else {
            archive_path::file_name(&name)
        };
        let target =
            archive_path::resolve_output_path(&root, relative, index, self.options.strict_paths)?;

        self.write_entry(index, &name, &target)?;
        Ok(target)
    }

    /// Extracts the entry named `name` (see [`find_index`](Self::find_index)).
    pub fn extract_file(&mut self, name: &str, recreate_path: bool) -> Result<PathBuf> {
        let index = self.require_index(name, "extract_file")?;
        self.extract(index, recreate_path)
    }

    /// Extracts every entry, in index order, into the output folder.
    ///
    /// Returns the number of entries extracted. Stops at the first failure;
    /// files already written are left in place.
    pub fn extract_all(&mut self) -> Result<usize> {
        self.ensure_mode(Mode::Reading, "extract_all")?;
        let count = self.directory.len();
        if count == 0 {
            let err = Error::NoData("archive has no entries".into());
            log::warn!("extract_all: {}", err);
            return Err(err);
        }

        let root = self.require_output_folder()?;
        fs::create_dir_all(&root)?;

        for index in 0..count {
            if self.options.verbose {
                log::info!(
                    "Extracting {}/{}: {}",
                    index + 1,
                    count,
                    self.directory.name(index).unwrap_or_default()
                );
            }
            if let Err(e) = self.extract_inner(index, true) {
                let err = Error::EntryFailed {
                    operation: "extract_all",
                    index,
                    name: self.directory.name(index).unwrap_or_default().to_string(),
                    source: Box::new(e),
                };
                log::warn!("{}", err);
                return Err(err);
            }
        }
        Ok(count)
    }

    /// Extracts the folder at `folder_index` and everything below it.
    ///
    /// Each member is written to `output_path` (default: the output folder)
    /// joined with its name minus the folder's own name, so the folder itself
    /// maps to `output_path`. Returns the number of entries extracted.
    pub fn extract_folder(&mut self, folder_index: usize, output_path: Option<&Path>) -> Result<usize> {
        self.ensure_mode(Mode::Reading, "extract_folder")?;
        let result = self.extract_folder_inner(folder_index, output_path);
        if let Err(e) = &result {
            log::warn!("extract_folder: {}", e);
        }
        result
    }

    fn extract_folder_inner(&mut self, folder_index: usize, output_path: Option<&Path>) -> Result<usize> {
        let prefix = self.name(folder_index)?.to_string();
        if !archive_path::is_folder_name(&prefix) {
            return Err(Error::NotAFolder {
                index: folder_index,
                name: prefix,
            });
        }

        let root = match output_path {
            Some(path) => path.to_path_buf(),
            None => self.require_output_folder()?,
        };

        let members: Vec<(usize, String)> = self
            .directory
            .iter()
            .filter(|(_, name)| name.starts_with(&prefix))
            .map(|(index, name)| (index, name.to_string()))
            .collect();

        fs::create_dir_all(&root)?;
        for (index, name) in &members {
            let relative = &name[prefix.len()..];
            let written = archive_path::resolve_output_path(
                &root,
                relative,
                *index,
                self.options.strict_paths,
            )
            .and_then(|target| self.write_entry(*index, name, &target));

            if let Err(e) = written {
                return Err(Error::EntryFailed {
                    operation: "extract_folder",
                    index: *index,
                    name: name.clone(),
                    source: Box::new(e),
                });
            }
        }
        Ok(members.len())
    }

    /// Decompresses the entry at `index` into a new buffer.
    ///
    /// Folder markers yield an empty buffer.
    pub fn extract_data(&mut self, index: usize) -> Result<Vec<u8>> {
        let container = self.reading_container("extract_data")?;
        container
            .extract_to_bytes(index)
            .inspect_err(|e| log::warn!("extract_data: {}", e))
    }

    /// Decompresses the entry at `index` into the session's scratch buffer
    /// and borrows it.
    ///
    /// The slice stays valid until the session is next used mutably. The
    /// buffer is reused by later calls; [`release_scratch`](Self::release_scratch)
    /// frees it.
    pub fn extract_data_ref(&mut self, index: usize) -> Result<&[u8]> {
        let mut scratch = std::mem::take(&mut self.scratch);
        let result = self
            .reading_container("extract_data_ref")
            .and_then(|container| container.extract_into(index, &mut scratch));
        self.scratch = scratch;

        match result {
            Ok(()) => Ok(self.scratch.as_slice()),
            Err(e) => {
                log::warn!("extract_data_ref: {}", e);
                Err(e)
            }
        }
    }

    /// Frees the scratch buffer used by [`extract_data_ref`](Self::extract_data_ref).
    pub fn release_scratch(&mut self) {
        self.scratch = Vec::new();
    }

    /// Extracts the entry at `index` as a [`BufferedItem`].
    pub fn extract_to_buffer(&mut self, index: usize) -> Result<BufferedItem> {
        let entry = self.entry(index)?;
        if entry.is_folder() {
            return Ok(BufferedItem {
                name: entry.name,
                payload: None,
                modified: entry.modified,
            });
        }

        let data = self.extract_data(index)?;
        if self.options.verbose {
            log::info!("Extracting to buffer: {}", entry.name);
        }
        Ok(BufferedItem {
            name: entry.name,
            payload: Some(data),
            modified: entry.modified,
        })
    }

    /// Extracts the entry named `name` as a [`BufferedItem`].
    pub fn extract_file_to_buffer(&mut self, name: &str) -> Result<BufferedItem> {
        let index = self.require_index(name, "extract_file_to_buffer")?;
        self.extract_to_buffer(index)
    }

    /// Extracts every file entry into a name → bytes map. Folder markers are
    /// skipped.
    pub fn extract_all_to_buffer(&mut self) -> Result<BufferedMap> {
        self.ensure_mode(Mode::Reading, "extract_all_to_buffer")?;

        let files: Vec<(usize, String)> = self
            .directory
            .iter()
            .filter(|(_, name)| archive_path::is_file_name(name))
            .map(|(index, name)| (index, name.to_string()))
            .collect();

        let mut map = BufferedMap::new();
        for (index, name) in files {
            match self.extract_data(index) {
                Ok(data) => {
                    map.entry(name).or_insert(data);
                }
                Err(e) => {
                    return Err(Error::EntryFailed {
                        operation: "extract_all_to_buffer",
                        index,
                        name,
                        source: Box::new(e),
                    });
                }
            }
        }
        Ok(map)
    }

    fn require_output_folder(&self) -> Result<PathBuf> {
        self.output_folder
            .clone()
            .ok_or_else(|| Error::NoData("no output folder set".into()))
    }

    fn require_index(&self, name: &str, operation: &'static str) -> Result<usize> {
        self.find_index(name).ok_or_else(|| {
            let err = Error::EntryNotFound {
                name: name.to_string(),
            };
            log::warn!("{}: {}", operation, err);
            err
        })
    }

    fn write_entry(&mut self, index: usize, name: &str, target: &Path) -> Result<()> {
        if archive_path::is_folder_name(name) {
            fs::create_dir_all(target)?;
            return Ok(());
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let restore = self.options.restore_modified_time;
        let verbose = self.options.verbose;
        let container = self.reading_container("extract")?;
        let (_, modified) = container.extract_to_file(index, target)?;

        if verbose {
            log::info!("Extracting: {}", name);
        }
        if let (true, Some(time)) = (restore, modified) {
            if let Err(e) = filetime::set_file_mtime(target, time.as_file_time()) {
                log::warn!("Failed to set modification time on {}: {}", target.display(), e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{OpenPolicy, SessionOptions};
    use crate::timestamp::Timestamp;

    fn build(dir: &Path, items: &[BufferedItem]) -> PathBuf {
        let path = dir.join("fixture.zip");
        let mut session = ArchiveSession::with_options(SessionOptions::new().verbose(false));
        session.open_for_write(&path, OpenPolicy::ForceWrite).unwrap();
        session.add_items(items).unwrap();
        session.close().unwrap();
        path
    }

    fn reader(path: &Path) -> ArchiveSession {
        let mut session = ArchiveSession::with_options(SessionOptions::new().verbose(false));
        session.open_for_read(path).unwrap();
        session
    }

    #[test]
    fn test_extract_recreates_path() {
        let dir = tempfile::tempdir().unwrap();
        let zip = build(dir.path(), &[BufferedItem::file("a/b/c.txt", b"deep".to_vec())]);
        let mut session = reader(&zip);
        let out = dir.path().join("out");
        session.set_output_folder(Some(&out));

        let written = session.extract(0, true).unwrap();
        assert_eq!(written, out.join("a").join("b").join("c.txt"));
        assert_eq!(fs::read(&written).unwrap(), b"deep");

        let flat = session.extract(0, false).unwrap();
        assert_eq!(flat, out.join("c.txt"));
        assert!(flat.exists());
    }

    #[test]
    fn test_extract_restores_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let time = Timestamp::from_unix_secs(1_500_000_000);
        let zip = build(
            dir.path(),
            &[BufferedItem::file("t.txt", b"t".to_vec()).modified(time)],
        );
        let mut session = reader(&zip);
        let written = session.extract(0, true).unwrap();
        let meta = fs::metadata(&written).unwrap();
        assert_eq!(Timestamp::from_metadata(&meta), time);
    }

    #[test]
    fn test_extract_bad_index() {
        let dir = tempfile::tempdir().unwrap();
        let zip = build(dir.path(), &[BufferedItem::file("x", b"x".to_vec())]);
        let mut session = reader(&zip);
        assert!(matches!(
            session.extract(4, true).unwrap_err(),
            Error::IndexOutOfRange { index: 4, count: 1 }
        ));
    }

    #[test]
    fn test_extract_without_output_folder() {
        let dir = tempfile::tempdir().unwrap();
        let zip = build(dir.path(), &[BufferedItem::file("x", b"x".to_vec())]);
        let mut session = ArchiveSession::from_buffer(fs::read(&zip).unwrap()).unwrap();
        assert!(matches!(session.extract(0, true).unwrap_err(), Error::NoData(_)));
        assert_eq!(session.extract_data(0).unwrap(), b"x");
    }

    #[test]
    fn test_extract_requires_reading() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = ArchiveSession::new();
        session
            .open_for_write(dir.path().join("w.zip"), OpenPolicy::ForceWrite)
            .unwrap();
        let err = session.extract(0, true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "extract requires reading mode, but the session is writing"
        );
    }

    #[test]
    fn test_extract_folder_strips_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let zip = build(
            dir.path(),
            &[
                BufferedItem::folder("root"),
                BufferedItem::folder("root/sub"),
                BufferedItem::file("root/sub/f.txt", b"f".to_vec()),
                BufferedItem::file("root/g.txt", b"g".to_vec()),
                BufferedItem::file("other.txt", b"o".to_vec()),
            ],
        );
        let mut session = reader(&zip);
        let out = dir.path().join("copy");

        assert_eq!(session.extract_folder(1, Some(&out)).unwrap(), 2);
        assert_eq!(fs::read(out.join("f.txt")).unwrap(), b"f");
        assert!(!out.join("g.txt").exists());
        assert!(!out.join("other.txt").exists());
    }

    #[test]
    fn test_extract_folder_on_file() {
        let dir = tempfile::tempdir().unwrap();
        let zip = build(dir.path(), &[BufferedItem::file("f", b"f".to_vec())]);
        let mut session = reader(&zip);
        assert!(matches!(
            session.extract_folder(0, None).unwrap_err(),
            Error::NotAFolder { index: 0, .. }
        ));
    }

    #[test]
    fn test_extract_data_ref_reuses_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let zip = build(
            dir.path(),
            &[
                BufferedItem::file("a", b"first".to_vec()),
                BufferedItem::file("b", vec![7u8; 100]),
            ],
        );
        let mut session = reader(&zip);
        assert_eq!(session.extract_data_ref(0).unwrap(), b"first");
        assert_eq!(session.extract_data_ref(1).unwrap(), &[7u8; 100][..]);
        session.release_scratch();
        assert!(session.extract_data_ref(9).is_err());
    }

    #[test]
    fn test_extract_all_to_buffer_skips_folders() {
        let dir = tempfile::tempdir().unwrap();
        let zip = build(
            dir.path(),
            &[
                BufferedItem::folder("d"),
                BufferedItem::file("d/one", b"1".to_vec()),
                BufferedItem::file("two", b"2".to_vec()),
            ],
        );
        let mut session = reader(&zip);
        let map = session.extract_all_to_buffer().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["d/one"], b"1");
        assert_eq!(map["two"], b"2");

        let folder = session.extract_to_buffer(0).unwrap();
        assert!(folder.is_folder());
        assert!(folder.payload.is_none());
    }

    #[test]
    fn test_extract_file_by_basename() {
        let dir = tempfile::tempdir().unwrap();
        let zip = build(dir.path(), &[BufferedItem::file("x/y/z.bin", b"z".to_vec())]);
        let mut session = reader(&zip);
        let item = session.extract_file_to_buffer("z.bin").unwrap();
        assert_eq!(item.name, "x/y/z.bin");
        assert!(session.extract_file("nope", true).unwrap_err().is_not_found());
    }
}
