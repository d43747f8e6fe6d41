//! The ZIP container layer.
//!
//! [`detect`] holds the magic-byte probes; [`container`] wraps the `zip`
//! crate behind a reader/writer handle that reports entry indices.

pub mod container;
pub mod detect;

pub use detect::ZIP_MAGIC;
