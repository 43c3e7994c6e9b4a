//! In-memory storage backend for testing.

use crate::StorageBackend;
use crate::backend::BoxSyncWrite;
use crate::error::{ErrorKind, Result};
use crate::models::FileInfo;
use crate::path::validate as validate_path;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{Error as IoError, ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;

type Files = Arc<RwLock<HashMap<PathBuf, (OffsetDateTime, Vec<u8>)>>>;

/// In-memory storage backend for testing.
///
/// Files live in a `HashMap` behind a synchronous [`RwLock`] so that the
/// blocking writers handed out by [`writer()`](StorageBackend::writer) can
/// append to them without an async context. Cloning the backend shares the
/// same files, which lets a test keep a handle while the code under test owns
/// another.
///
/// # Examples
///
/// ```
/// use vwarc_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([("logs/log.txt", b"started")]);
/// assert!(backend.exists(Path::new("logs/log.txt")).await?);
/// backend.write(Path::new("archive.warc"), b"WARC/1.1").await?;
/// assert_eq!(backend.paths(), vec![Path::new("archive.warc"), Path::new("logs/log.txt")]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MockBackend {
    name: String,
    storage: Files,
    max_file_size: Option<usize>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = HashMap::new();
        let now = OffsetDateTime::now_utc();
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                panic!("MockBackend::with_files: invalid path {}", path.display());
            };
            map.insert(validated, (now, data.into()));
        }
        Self {
            name: "mock".to_string(),
            storage: Arc::new(RwLock::new(map)),
            max_file_size: None,
        }
    }

    /// Change the name of the mock backend.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Fail streamed writes that would grow a file past `bytes`, as a full
    /// disk would. Whatever still fits is written first.
    pub fn with_max_file_size(mut self, bytes: usize) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    /// Sorted list of every stored path.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = match self.storage.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        };
        paths.sort();
        paths
    }

    fn poisoned() -> ErrorKind {
        ErrorKind::BackendError("mock storage lock poisoned".to_string())
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

/// Appends straight into the shared map, so bytes are visible to readers as
/// soon as each `write()` returns.
struct MockWriter {
    path: PathBuf,
    storage: Files,
    max_size: Option<usize>,
}
impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.storage.write().map_err(|_| IoError::other("mock storage lock poisoned"))?;
        let (modified, data) = guard.entry(self.path.clone()).or_insert_with(|| (OffsetDateTime::now_utc(), Vec::new()));
        let room = self.max_size.map_or(buf.len(), |max| max.saturating_sub(data.len()));
        if room == 0 && !buf.is_empty() {
            return Err(IoError::new(IoErrorKind::StorageFull, "mock storage full"));
        }
        let written = room.min(buf.len());
        *modified = OffsetDateTime::now_utc();
        data.extend_from_slice(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        Ok(self.storage.read().map_err(|_| Self::poisoned())?.contains_key(&path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        let guard = self.storage.read().map_err(|_| Self::poisoned())?;
        let (_modified, data) = guard.get(&path).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.clone())))?;
        Ok(data.clone())
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        self.storage.write().map_err(|_| Self::poisoned())?.insert(path, (OffsetDateTime::now_utc(), data.to_vec()));
        Ok(())
    }

    async fn writer(&self, path: &Path) -> Result<BoxSyncWrite> {
        let path = validate_path(path)?;
        // Truncate, same as File::create.
        self.storage.write().map_err(|_| Self::poisoned())?.insert(path.clone(), (OffsetDateTime::now_utc(), Vec::new()));
        Ok(Box::new(MockWriter { path, storage: Arc::clone(&self.storage), max_size: self.max_file_size }))
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let path = validate_path(path)?;
        let guard = self.storage.read().map_err(|_| Self::poisoned())?;
        let (modified, data) = guard.get(&path).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.clone())))?;
        Ok(FileInfo::new(&path, data.len() as u64, *modified))
    }
}
