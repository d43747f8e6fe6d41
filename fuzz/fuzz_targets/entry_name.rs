//! Fuzz target for entry name validation and output path resolution.
//!
//! Run with: cargo +nightly fuzz run entry_name
//!
//! Properties checked:
//! - A name accepted for writing has no `.`/`..` segment and no leading separator
//! - Strict resolution of any name stays below the output root

#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use zipdir::archive_path;

fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };

    if archive_path::validate_entry_name(name).is_ok() {
        assert!(!name.starts_with('/'));
        let body = name.strip_suffix('/').unwrap_or(name);
        assert!(!body.split('/').any(|s| s.is_empty() || s == "." || s == ".."));
    }

    let root = Path::new("/fuzz-root");
    if let Ok(path) = archive_path::resolve_output_path(root, name, 0, true) {
        assert!(path.starts_with(root), "{name:?} escaped to {}", path.display());
    }
});
