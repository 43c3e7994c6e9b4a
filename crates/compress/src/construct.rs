use crate::Compression;
use crate::error::{Error, ErrorKind};
use std::{path::Path, str::FromStr};

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

impl FromStr for Compression {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "uncompressed" => Ok(Compression::None),
            "gz" | "gzip" => Ok(Compression::Gzip),
            // WARC readers only understand per-record gzip members.
            _ => exn::bail!(ErrorKind::UnsupportedFormat(s.to_string())),
        }
    }
}
impl From<&[u8]> for Compression {
    fn from(value: &[u8]) -> Self {
        Compression::from_magic_bytes(value)
    }
}
impl From<bool> for Compression {
    /// Maps a "gzip enabled" flag onto a format.
    fn from(gzip: bool) -> Self {
        if gzip { Compression::Gzip } else { Compression::None }
    }
}
impl Compression {
    /// Detect compression from a file extension.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| match ext.to_lowercase().as_str() {
                "gz" => Compression::Gzip,
                _ => Compression::None,
            })
            .unwrap_or(Compression::None)
    }

    /// Detect compression format from magic bytes.
    ///
    /// Returns `None` variant if no magic bytes match or if the input
    /// is too short to detect any format.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Self {
        if bytes.starts_with(&GZIP_MAGIC) {
            return Compression::Gzip;
        }
        Compression::None
    }
}
