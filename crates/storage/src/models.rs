//! Storage models.

use std::path::PathBuf;
use time::OffsetDateTime;
use vwarc_compress::Compression;

/// File metadata returned by storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
    /// Detected compression format from file extension
    pub compression: Compression,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: OffsetDateTime) -> Self {
        let path = path.into();
        let compression = Compression::from_path(&path);
        Self { path, size, modified, compression }
    }
}
