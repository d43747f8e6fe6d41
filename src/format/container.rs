//! Facade over the ZIP byte-container primitive.
//!
//! The [`Container`] owns one open ZIP reader or writer. The handle kind is
//! part of the type, so reader-only operations on a writer (and the other
//! way round) are reported as [`Error::ModeMismatch`] instead of being
//! undefined.
//!
//! Duplicate checking is deliberately absent here; the caller's entry
//! directory decides what may be appended. Every append reports the index the
//! container assigned to the new entry.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::archive_path;
use crate::entry::Entry;
use crate::session::Mode;
use crate::timestamp::Timestamp;
use crate::{Error, Result};

/// Payloads at or below this size are stored verbatim; larger ones are deflated.
pub const DEFAULT_STORE_THRESHOLD: u64 = 40;

/// Upper bound on the buffer space reserved from a declared entry size.
const PREALLOC_LIMIT: u64 = 1 << 20;

/// Byte source behind a reader handle.
pub(crate) enum ReadSource {
    File(BufReader<File>),
    Memory(Cursor<Vec<u8>>),
}

impl Read for ReadSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ReadSource::File(r) => r.read(buf),
            ReadSource::Memory(r) => r.read(buf),
        }
    }
}

impl Seek for ReadSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            ReadSource::File(r) => r.seek(pos),
            ReadSource::Memory(r) => r.seek(pos),
        }
    }
}

/// An open container, either for reading or for writing.
pub enum Container {
    /// Read-only handle over a file or an in-memory buffer.
    Reader(ContainerReader),
    /// Append-only handle over a freshly created file.
    Writer(ContainerWriter),
}

/// Reader half of [`Container`].
pub struct ContainerReader {
    archive: ZipArchive<ReadSource>,
}

/// Writer half of [`Container`].
pub struct ContainerWriter {
    writer: ZipWriter<BufWriter<File>>,
    /// Number of entries appended so far.
    appended: usize,
}

fn store_or_deflate(size: u64, threshold: u64, modified: zip::DateTime) -> SimpleFileOptions {
    let method = if size > threshold {
        CompressionMethod::Deflated
    } else {
        CompressionMethod::Stored
    };
    SimpleFileOptions::default()
        .compression_method(method)
        .last_modified_time(modified)
        .large_file(size > u32::MAX as u64)
}

impl Container {
    /// Opens the ZIP file at `path` for reading.
    pub fn open_reader(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::open_failed(path, e.to_string()))?;
        let archive = ZipArchive::new(ReadSource::File(BufReader::new(file)))
            .map_err(|e| Error::open_failed(path, e.to_string()))?;
        Ok(Container::Reader(ContainerReader { archive }))
    }

    /// Opens a ZIP container held in memory for reading.
    pub fn open_buffer(data: Vec<u8>) -> Result<Self> {
        let archive = ZipArchive::new(ReadSource::Memory(Cursor::new(data)))
            .map_err(|e| Error::open_failed("<buffer>", e.to_string()))?;
        Ok(Container::Reader(ContainerReader { archive }))
    }

    /// Creates (or truncates) the file at `path` and opens it for writing.
    pub fn open_writer(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| Error::open_failed(path, e.to_string()))?;
        Ok(Container::Writer(ContainerWriter {
            writer: ZipWriter::new(BufWriter::new(file)),
            appended: 0,
        }))
    }

    /// The mode this handle serves.
    pub fn mode(&self) -> Mode {
        match self {
            Container::Reader(_) => Mode::Reading,
            Container::Writer(_) => Mode::Writing,
        }
    }

    /// Number of entries in the container.
    pub fn count(&self) -> usize {
        match self {
            Container::Reader(r) => r.archive.len(),
            Container::Writer(w) => w.appended,
        }
    }

    fn reader(&mut self, operation: &'static str) -> Result<&mut ContainerReader> {
        match self {
            Container::Reader(r) => Ok(r),
            Container::Writer(_) => Err(Error::ModeMismatch {
                operation,
                required: Mode::Reading,
                actual: Mode::Writing,
            }),
        }
    }

    fn writer(&mut self, operation: &'static str) -> Result<&mut ContainerWriter> {
        match self {
            Container::Writer(w) => Ok(w),
            Container::Reader(_) => Err(Error::ModeMismatch {
                operation,
                required: Mode::Writing,
                actual: Mode::Reading,
            }),
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let count = self.count();
        if index < count {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange { index, count })
        }
    }

    /// Returns the metadata of the entry at `index` without decompressing it.
    pub fn stat(&mut self, index: usize) -> Result<Entry> {
        self.check_index(index)?;
        let r = self.reader("stat")?;
        let file = r.archive.by_index_raw(index)?;
        Ok(Entry {
            index,
            name: file.name().to_string(),
            compressed_size: file.compressed_size(),
            uncompressed_size: file.size(),
            modified: file.last_modified().map(|dt| Timestamp::from_dos(&dt)),
        })
    }

    /// Appends an in-memory entry and returns its index.
    ///
    /// A separator-terminated `name` writes a zero-length folder marker and
    /// ignores `data`. `modified` defaults to the current time.
    pub fn append_bytes(
        &mut self,
        name: &str,
        data: &[u8],
        modified: Option<Timestamp>,
        store_threshold: u64,
    ) -> Result<usize> {
        let w = self.writer("append_bytes")?;
        let index = w.appended;
        let dt = modified.unwrap_or_else(Timestamp::now).to_dos();

        if archive_path::is_folder_name(name) {
            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Stored)
                .last_modified_time(dt);
            w.writer.add_directory(name, options)?;
        } else {
            let options = store_or_deflate(data.len() as u64, store_threshold, dt);
            w.writer.start_file(name, options)?;
            if let Err(e) = w.writer.write_all(data) {
                w.abort_current(name);
                return Err(e.into());
            }
        }

        w.appended += 1;
        Ok(index)
    }

    /// Appends the file at `fs_path` under `name` and returns its index.
    ///
    /// The entry carries the file's modification time. The store/deflate
    /// choice uses the on-disk size.
    pub fn append_file(&mut self, fs_path: &Path, name: &str, store_threshold: u64) -> Result<usize> {
        let w = self.writer("append_file")?;
        let index = w.appended;

        let file = File::open(fs_path)?;
        let metadata = file.metadata()?;
        let dt = Timestamp::from_metadata(&metadata).to_dos();

        w.writer
            .start_file(name, store_or_deflate(metadata.len(), store_threshold, dt))?;
        if let Err(e) = io::copy(&mut BufReader::new(file), &mut w.writer) {
            w.abort_current(name);
            return Err(e.into());
        }

        w.appended += 1;
        Ok(index)
    }

    /// Decompresses the entry at `index` into `buf`, replacing its contents.
    pub fn extract_into(&mut self, index: usize, buf: &mut Vec<u8>) -> Result<()> {
        self.check_index(index)?;
        let r = self.reader("extract_to_bytes")?;
        let mut file = r.archive.by_index(index)?;
        buf.clear();
        // The declared size is untrusted; read_to_end grows past the cap.
        buf.reserve(file.size().min(PREALLOC_LIMIT) as usize);
        file.read_to_end(buf)?;
        Ok(())
    }

    /// Decompresses the entry at `index` into a new buffer.
    pub fn extract_to_bytes(&mut self, index: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.extract_into(index, &mut buf)?;
        Ok(buf)
    }

    /// Decompresses the entry at `index` into a new file at `out_path`.
    ///
    /// Returns the number of bytes written and the entry's modification time.
    pub fn extract_to_file(
        &mut self,
        index: usize,
        out_path: &Path,
    ) -> Result<(u64, Option<Timestamp>)> {
        self.check_index(index)?;
        let r = self.reader("extract_to_file")?;
        let mut file = r.archive.by_index(index)?;
        let modified = file.last_modified().map(|dt| Timestamp::from_dos(&dt));

        let mut out = BufWriter::new(File::create(out_path)?);
        let written = io::copy(&mut file, &mut out)?;
        out.flush()?;
        Ok((written, modified))
    }

    /// Releases the handle. A writer first writes the central directory.
    pub fn finalize_and_close(self) -> Result<()> {
        match self {
            Container::Reader(_) => Ok(()),
            Container::Writer(w) => {
                let mut sink = w.writer.finish()?;
                sink.flush()?;
                Ok(())
            }
        }
    }
}

impl ContainerWriter {
    fn abort_current(&mut self, name: &str) {
        if let Err(e) = self.writer.abort_file() {
            log::warn!("Failed to discard partial entry '{}': {}", name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_sample(path: &Path) {
        let mut c = Container::open_writer(path).unwrap();
        assert_eq!(c.append_bytes("small.txt", b"tiny", None, 40).unwrap(), 0);
        let big = vec![b'a'; 1000];
        assert_eq!(c.append_bytes("dir/", &[], None, 40).unwrap(), 1);
        assert_eq!(c.append_bytes("dir/big.txt", &big, None, 40).unwrap(), 2);
        assert_eq!(c.count(), 3);
        c.finalize_and_close().unwrap();
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.zip");
        write_sample(&path);

        let mut c = Container::open_reader(&path).unwrap();
        assert_eq!(c.mode(), Mode::Reading);
        assert_eq!(c.count(), 3);

        let small = c.stat(0).unwrap();
        assert_eq!(small.name, "small.txt");
        assert_eq!(small.compressed_size, 4);
        assert_eq!(small.uncompressed_size, 4);

        let folder = c.stat(1).unwrap();
        assert!(folder.is_folder());
        assert_eq!(folder.uncompressed_size, 0);

        let big = c.stat(2).unwrap();
        assert_eq!(big.uncompressed_size, 1000);
        assert!(big.compressed_size < 1000);

        assert_eq!(c.extract_to_bytes(0).unwrap(), b"tiny");
        assert_eq!(c.extract_to_bytes(2).unwrap(), vec![b'a'; 1000]);
    }

    #[test]
    fn test_stat_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.zip");
        write_sample(&path);

        let mut c = Container::open_reader(&path).unwrap();
        let err = c.stat(3).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 3, count: 3 }));
    }

    #[test]
    fn test_reader_operations_on_writer() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = Container::open_writer(&dir.path().join("w.zip")).unwrap();
        c.append_bytes("a", b"x", None, 40).unwrap();
        assert!(c.stat(0).unwrap_err().is_mode_mismatch());
        assert!(c.extract_to_bytes(0).unwrap_err().is_mode_mismatch());
    }

    #[test]
    fn test_append_on_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.zip");
        write_sample(&path);

        let mut c = Container::open_reader(&path).unwrap();
        let err = c.append_bytes("x", b"y", None, 40).unwrap_err();
        assert!(err.is_mode_mismatch());
    }

    #[test]
    fn test_open_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.zip");
        write_sample(&path);

        let bytes = std::fs::read(&path).unwrap();
        let mut c = Container::open_buffer(bytes).unwrap();
        assert_eq!(c.count(), 3);
        assert_eq!(c.extract_to_bytes(0).unwrap(), b"tiny");
    }

    #[test]
    fn test_open_reader_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.zip");
        std::fs::write(&path, b"PKnot really a zip").unwrap();
        let err = Container::open_reader(&path).err().unwrap();
        assert!(matches!(err, Error::OpenFailed { .. }));
    }

    #[test]
    fn test_oversized_declared_size_does_not_preallocate() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .large_file(true);
        zip.start_file("f", options).unwrap();
        zip.write_all(b"data").unwrap();
        let mut bytes = zip.finish().unwrap().into_inner();

        // Zip64 extra field: tag 0x0001, 16 bytes, uncompressed size first.
        let tag = [0x01, 0x00, 0x10, 0x00];
        let mut patched = 0;
        let mut i = 0;
        while i + 12 <= bytes.len() {
            if bytes[i..i + 4] == tag && bytes[i + 4..i + 12] == 4u64.to_le_bytes() {
                bytes[i + 4..i + 12].copy_from_slice(&(1u64 << 62).to_le_bytes());
                patched += 1;
            }
            i += 1;
        }
        assert!(patched > 0);

        let mut c = Container::open_buffer(bytes).unwrap();
        assert_eq!(c.stat(0).unwrap().uncompressed_size, 1 << 62);
        // Must come back as a value, not abort on allocation.
        if let Ok(data) = c.extract_to_bytes(0) {
            assert_eq!(data, b"data");
        }
    }

    #[test]
    fn test_append_file_keeps_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        std::fs::write(&src, b"file payload that is longer than forty bytes!!").unwrap();
        let mtime = Timestamp::from_unix_secs(1_600_000_000);
        filetime::set_file_mtime(&src, mtime.as_file_time()).unwrap();

        let path = dir.path().join("out.zip");
        let mut c = Container::open_writer(&path).unwrap();
        assert_eq!(c.append_file(&src, "src.txt", 40).unwrap(), 0);
        c.finalize_and_close().unwrap();

        let mut c = Container::open_reader(&path).unwrap();
        let entry = c.stat(0).unwrap();
        assert_eq!(entry.modified, Some(mtime));
        let out = dir.path().join("copy.txt");
        let (written, modified) = c.extract_to_file(0, &out).unwrap();
        assert_eq!(written, std::fs::metadata(&src).unwrap().len());
        assert_eq!(modified, Some(mtime));
        assert_eq!(std::fs::read(&out).unwrap(), std::fs::read(&src).unwrap());
    }
}
