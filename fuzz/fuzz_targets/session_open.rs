//! Fuzz target for opening a session over arbitrary bytes.
//!
//! Run with: cargo +nightly fuzz run session_open
//!
//! Opening must never panic. If the bytes parse, every entry is queried and
//! decoded into memory so the directory rebuild and the extraction paths
//! both see adversarial input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use zipdir::{ArchiveSession, SessionOptions};

fuzz_target!(|data: &[u8]| {
    let mut session = ArchiveSession::with_options(SessionOptions::new().verbose(false));
    if session.open_buffer(data.to_vec()).is_err() {
        return;
    }

    for index in 0..session.count() {
        let _ = session.is_folder(index);
        let _ = session.entry(index);
        let _ = session.extract_data_ref(index);
    }
    let _ = session.extract_all_to_buffer();
});
