//! Separator-aware helpers for archive entry names.
//!
//! Entry names inside a ZIP container are always separated with `/`. A name
//! ending with the separator is a folder marker; anything else is a file.
//! Names are translated to the host path convention only when they are
//! joined onto a filesystem folder (see [`resolve_output_path`]).

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Separator used inside archive entry names.
pub const SEPARATOR: char = '/';

/// Maximum length of an entry name in bytes.
///
/// The ZIP local and central headers store the name length in a 16-bit field.
const MAX_NAME_LENGTH: usize = u16::MAX as usize;

fn is_sep(ch: char) -> bool {
    ch == '/' || ch == '\\'
}

/// Separators that split an entry name into host path components. A
/// backslash is an ordinary file name character outside Windows.
fn is_host_sep(ch: char) -> bool {
    ch == '/' || (cfg!(windows) && ch == '\\')
}

/// Joins `base` and `relative` with exactly one separator between them.
///
/// Either side may already supply the boundary (`/` or `\`); the result never
/// contains a doubled separator at the seam. An empty side yields the other
/// side unchanged.
///
/// # Examples
///
/// ```
/// use zipdir::archive_path::join;
///
/// assert_eq!(join("root", "file.txt"), "root/file.txt");
/// assert_eq!(join("root/", "file.txt"), "root/file.txt");
/// assert_eq!(join("root/", "/file.txt"), "root/file.txt");
/// assert_eq!(join("", "file.txt"), "file.txt");
/// ```
pub fn join(base: &str, relative: &str) -> String {
    if base.is_empty() {
        return relative.to_string();
    }
    if relative.is_empty() {
        return base.to_string();
    }

    let base_ends = base.ends_with(is_sep);
    let rel_starts = relative.starts_with(is_sep);

    match (base_ends, rel_starts) {
        (true, true) => format!("{}{}", &base[..base.len() - 1], relative),
        (true, false) | (false, true) => format!("{}{}", base, relative),
        (false, false) => format!("{}{}{}", base, SEPARATOR, relative),
    }
}

/// Appends the separator if `name` does not already end with it.
///
/// The operation is idempotent.
pub fn to_folder_name(name: &str) -> String {
    if is_folder_name(name) {
        name.to_string()
    } else {
        format!("{}{}", name, SEPARATOR)
    }
}

/// Returns `true` if `name` is a folder marker (ends with the separator).
#[inline]
pub fn is_folder_name(name: &str) -> bool {
    name.ends_with(SEPARATOR)
}

/// Returns `true` if `name` is a file name: non-empty and not separator-terminated.
#[inline]
pub fn is_file_name(name: &str) -> bool {
    !name.is_empty() && !is_folder_name(name)
}

/// Returns `true` if `name` contains the separator anywhere.
#[inline]
pub fn has_separator(name: &str) -> bool {
    name.contains(SEPARATOR)
}

/// Returns the final component of `name`.
///
/// A trailing separator is ignored, so `"a/b/"` yields `"b"`.
pub fn file_name(name: &str) -> &str {
    let trimmed = name.strip_suffix(SEPARATOR).unwrap_or(name);
    trimmed.rsplit(SEPARATOR).next().unwrap_or(trimmed)
}

/// Checks that `name` can be stored as an entry name.
///
/// Rejects empty names, NUL bytes, names starting with the separator, empty
/// interior segments, `.`/`..` segments and names longer than the ZIP header
/// allows.
pub fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidEntryName("empty name".into()));
    }
    if name.contains('\0') {
        return Err(Error::InvalidEntryName(format!("'{}' contains NUL byte", name)));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(Error::InvalidEntryName(format!(
            "name exceeds maximum length of {} bytes",
            MAX_NAME_LENGTH
        )));
    }
    if name.starts_with(SEPARATOR) {
        return Err(Error::InvalidEntryName(format!(
            "'{}' is an absolute path",
            name
        )));
    }

    let body = name.strip_suffix(SEPARATOR).unwrap_or(name);
    for segment in body.split(SEPARATOR) {
        match segment {
            "" => {
                return Err(Error::InvalidEntryName(format!(
                    "'{}' has an empty segment",
                    name
                )));
            }
            "." | ".." => {
                return Err(Error::InvalidEntryName(format!(
                    "'{}' has a '{}' segment",
                    name, segment
                )));
            }
            _ => {}
        }
    }

    Ok(())
}

/// Builds the archive-relative name of `path` below `root`.
///
/// Components are joined with the separator regardless of the host
/// convention. Returns `None` if `path` is not below `root` or a component is
/// not valid UTF-8.
pub fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        parts.push(component.as_os_str().to_str()?);
    }
    Some(parts.join("/"))
}

/// Translates the entry `name` to a filesystem path below `root`.
///
/// Separators are mapped to the host convention component by component; a
/// backslash only separates components on Windows. In strict mode, names with
/// `..` segments or a leading separator are refused; otherwise such segments
/// are dropped.
pub fn resolve_output_path(root: &Path, name: &str, index: usize, strict: bool) -> Result<PathBuf> {
    if strict && (name.starts_with(is_sep) || name.split(is_sep).any(|s| s == "..")) {
        return Err(Error::PathTraversal {
            index,
            name: name.to_string(),
        });
    }

    let mut out = root.to_path_buf();
    for segment in name.split(is_host_sep) {
        if segment.is_empty() || segment == "." || segment == ".." {
            continue;
        }
        out.push(segment);
    }
    Ok(out)
}
