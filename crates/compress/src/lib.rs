//! Compression for WARC output files.
//!
//! WARC files are either stored plain (`.warc`) or as a sequence of gzip
//! members (`.warc.gz`), one member per record, so that readers can seek to
//! any record offset and start decompressing from there. This crate wraps
//! that behind a small [`Compression`] enum, providing:
//!
//! - **Format detection** from file extensions ([`Compression::from_path`]) or
//!   magic bytes ([`Compression::from_magic_bytes`])
//! - **Per-member** compression ([`Compression::compress`]) and whole-file
//!   decompression of concatenated members ([`Compression::decompress`])
//! - **Naming** helpers ([`Compression::extension`])
//!
//! All compression uses the highest available level, prioritizing storage
//! space over speed.

mod construct;
pub mod error;
mod ops;
mod util;

/// A supported WARC compression format.
///
/// Defaults to [`None`](Self::None) (uncompressed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Uncompressed
    #[default]
    None,
    /// Gzip compression (.gz), one member per record
    Gzip,
}
