//! Container identification by magic bytes.
//!
//! A path or buffer is classified as a ZIP container when its first two
//! bytes are `PK`, the prefix shared by local file headers, empty archives
//! and spanned-archive markers.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Leading bytes of every ZIP container.
pub const ZIP_MAGIC: [u8; 2] = *b"PK";

/// Returns `true` if `data` starts with the ZIP magic bytes.
///
/// # Example
///
/// ```rust
/// use zipdir::format::detect::is_archive;
///
/// assert!(is_archive(b"PK\x03\x04rest"));
/// assert!(!is_archive(b"P"));
/// ```
pub fn is_archive(data: &[u8]) -> bool {
    data.len() >= ZIP_MAGIC.len() && data[..ZIP_MAGIC.len()] == ZIP_MAGIC
}

/// Returns `true` if `path` is an existing regular file starting with the
/// ZIP magic bytes.
pub fn is_zip_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if !path.is_file() {
        return false;
    }

    let mut magic = [0u8; 2];
    match File::open(path).and_then(|mut f| f.read_exact(&mut magic)) {
        Ok(()) => magic == ZIP_MAGIC,
        Err(e) => {
            log::debug!("Magic probe failed for '{}': {}", path.display(), e);
            false
        }
    }
}
