//! Storage backend trait and implementations.
//!
//! A WARC series only ever needs to create files, stream bytes into them, and
//! occasionally read something back (log files, tests). The `StorageBackend`
//! trait covers exactly that, so the series writer doesn't care whether it
//! writes to a local directory or to memory.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::Result;
use crate::models::FileInfo;
use async_trait::async_trait;
use std::io::Write;
use std::path::Path;

pub type BoxSyncWrite = Box<dyn Write + Send + 'static>;

/// Unified interface for storage backends.
///
/// # Path Handling
/// All paths are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations should
/// enforce this validation.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use vwarc_storage::{backend::StorageBackend, error::Result};
///
/// async fn size_of(backend: &dyn StorageBackend) -> Result<u64> {
///     let path = Path::new("out/archive--2017-01-01T000000.warc.gz");
///     if backend.exists(path).await? {
///         Ok(backend.stat(path).await?.size)
///     } else {
///         Ok(0)
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend (used for logging only).
    fn name(&self) -> &str;

    /// Check if a file exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Read file contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write file contents, creating or truncating the file.
    ///
    /// # Notes
    /// - Implementations should create parent directories as needed.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Open a file for streaming writes, creating or truncating it.
    ///
    /// Returns a `'static` boxed [`Write`] that the caller owns until the
    /// file is finished. The async setup (directories, file handle) happens
    /// before returning.
    ///
    /// # Notes
    /// - Implementations should create parent directories as needed.
    /// - Callers should call `flush()` before dropping so that errors are
    ///   propagated instead of lost on drop.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::io::Write;
    /// use std::path::Path;
    /// # use vwarc_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut file = backend.writer(Path::new("archive.warc")).await?;
    /// file.write_all(b"WARC/1.1\r\n").unwrap();
    /// file.flush().unwrap();
    /// # Ok(())
    /// # }
    /// ```
    async fn writer(&self, path: &Path) -> Result<BoxSyncWrite>;

    /// Get file metadata without reading contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn stat(&self, path: &Path) -> Result<FileInfo>;
}
