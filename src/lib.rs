//! # zipdir
//!
//! A ZIP archive session engine with a duplicate-safe entry directory,
//! recursive folder adds and folder-aware extraction.
//!
//! The central type is [`ArchiveSession`]: it owns at most one open ZIP
//! container, either for reading or for writing, together with an
//! [`EntryDirectory`] that maps entry names to indices. Every add is checked
//! against that directory, so a name is never written twice.
//!
//! ## Quick Start
//!
//! ### Creating an Archive
//!
//! ```rust,no_run
//! use zipdir::{ArchiveSession, BufferedItem, OpenPolicy, Result};
//!
//! fn main() -> Result<()> {
//!     let mut session = ArchiveSession::new();
//!     session.open_for_write("backup.zip", OpenPolicy::ForceWrite)?;
//!
//!     // Add a folder tree from disk
//!     let added = session.add_path("documents", None)?;
//!     println!("added {added} entries");
//!
//!     // Add data from memory
//!     session.add_item(&BufferedItem::file("notes/hello.txt", b"Hello, World!".to_vec()))?;
//!
//!     session.close()
//! }
//! ```
//!
//! ### Extracting an Archive
//!
//! ```rust,no_run
//! use std::path::Path;
//! use zipdir::{ArchiveSession, Result};
//!
//! fn main() -> Result<()> {
//!     let mut session = ArchiveSession::open("backup.zip")?;
//!
//!     for (index, name) in session.contents() {
//!         println!("{index}: {name}");
//!     }
//!
//!     session.set_output_folder(Some("./output"));
//!     session.extract_all()?;
//!
//!     // Extract one subtree somewhere else
//!     if let Some(index) = session.find_index("documents/") {
//!         session.extract_folder(index, Some(Path::new("./only-documents")))?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### One-call Helpers
//!
//! ```rust,no_run
//! let archive = zipdir::compress_folder("photos")?;
//! zipdir::extract_to(&archive, "photos-copy")?;
//! # Ok::<(), zipdir::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], with failures described by
//! [`Error`]. Lookups that may simply miss, such as
//! [`ArchiveSession::find_index`], return `Option`. Multi-item operations
//! stop at the first failing item and report it through
//! [`Error::EntryFailed`]; earlier items are not rolled back.
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade. Failures are logged at `warn`
//! level, the per-item trace of a verbose session at `info` and session
//! open/close at `debug`.
//!
//! ## Safety
//!
//! Entry names are validated before they are written. On extraction, names
//! with `..` segments or a leading separator are refused with
//! [`Error::PathTraversal`] unless [`SessionOptions::strict_paths`] is off.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod archive_path;
pub mod bulk;
pub mod directory;
pub mod entry;
pub mod error;
pub mod format;
pub mod session;
pub mod timestamp;
pub mod tree;

pub use directory::EntryDirectory;
pub use entry::{BufferedItem, BufferedMap, Entry};
pub use error::{Error, Result};
pub use format::detect::{is_archive, is_zip_file};
pub use session::{ArchiveSession, Mode, OpenPolicy, SessionOptions};
pub use timestamp::Timestamp;

pub use bulk::{
    compress_buf, compress_bytes, compress_file, compress_file_to, compress_folder,
    compress_folder_to, compress_here, compress_here_list, compress_list, extract, extract_to,
};
