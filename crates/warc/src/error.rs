//! WARC Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A WARC error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for WARC operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A timestamp can't be represented in WARC or HTTP date format.
    #[display("unrepresentable date: {_0}")]
    InvalidDate(#[error(not(source))] String),
    /// A record could not be serialized or compressed.
    #[display("failed to encode record {_0}")]
    Encode(#[error(not(source))] String),
    /// A new WARC file could not be created.
    #[display("failed to create WARC file: {}", _0.display())]
    Create(#[error(not(source))] PathBuf),
    /// Bytes could not be written to the open WARC file.
    #[display("failed to write WARC file: {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Writes are never retried: a half-written batch can't be rewound.
        false
    }
}
