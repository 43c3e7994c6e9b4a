//! Size-rotated sequence of WARC files.

use crate::error::{ErrorKind, Result};
use crate::{GIGABYTE, Record, RevisitCache, RevisitEntry, WARC_VERSION, WarcFields, file_suffix};
use exn::ResultExt;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};
use vwarc_compress::Compression;
use vwarc_storage::BackendHandle;
use vwarc_storage::backend::BoxSyncWrite;

const SOFTWARE: &str = concat!("vwarc-warc/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOptions {
    /// Base name of every file, relative to the backend root. May contain
    /// directories, e.g. `out/archive`.
    pub name: String,
    pub compression: Compression,
    /// A file is closed once more than this many bytes were written to it.
    pub max_size: u64,
    pub revisit_cache_size: usize,
    /// Extra fields for each file's `warcinfo` record.
    pub info: WarcFields,
}
impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            name: "archive".to_string(),
            compression: Compression::Gzip,
            max_size: (7.95 * GIGABYTE as f64) as u64,
            revisit_cache_size: 100_000,
            info: WarcFields::new(),
        }
    }
}

struct OpenFile {
    path: PathBuf,
    writer: BoxSyncWrite,
    size: u64,
}

/// Writes batches of records into a series of WARC files, starting a new
/// file whenever the current one grows past [`SeriesOptions::max_size`].
///
/// Each call to [`write_records`](Self::write_records) lands in exactly one
/// file. Records carrying a [revisit key](Record::cache_as) are remembered in
/// the [`RevisitCache`], which only ever describes the currently open file.
pub struct WarcSeries {
    backend: BackendHandle,
    options: SeriesOptions,
    current: Option<OpenFile>,
    created_names: HashMap<String, usize>,
    revisit_cache: RevisitCache,
    files: Vec<PathBuf>,
}

impl WarcSeries {
    pub fn new(backend: BackendHandle, options: SeriesOptions) -> Self {
        let revisit_cache = RevisitCache::new(options.revisit_cache_size);
        Self {
            backend,
            options,
            current: None,
            created_names: HashMap::new(),
            revisit_cache,
            files: Vec::new(),
        }
    }

    pub fn revisit_cache(&self) -> &RevisitCache {
        &self.revisit_cache
    }

    /// Every file created so far, in creation order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Path and size of the open file, if any.
    pub fn current(&self) -> Option<(&Path, u64)> {
        self.current.as_ref().map(|file| (file.path.as_path(), file.size))
    }

    /// Write one batch of records to the current file, opening a new file
    /// first if none is open.
    ///
    /// The whole batch is encoded in memory and written at once, so an error
    /// never leaves part of a record in the file.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn write_records(&mut self, records: Vec<Record>) -> Result<()> {
        let Some(first) = records.first() else {
            return Ok(());
        };
        let first_date = first.date();

        let mut buffer = Vec::new();
        let mut revisits = Vec::new();
        for record in &records {
            let (bytes, payload_digest) = self.encode(record)?;
            buffer.extend_from_slice(&bytes);
            if let (Some(key), Some(payload_digest)) = (record.revisit_key(), payload_digest) {
                revisits.push((key.to_string(), RevisitEntry {
                    record_id: record.record_id().to_string(),
                    payload_digest,
                    target_uri: record.target_uri().unwrap_or_default().to_string(),
                    date: record.date(),
                }));
            }
        }

        let mut file = match self.current.take() {
            Some(file) => file,
            None => self.open(first_date).await?,
        };
        if let Err(err) = write_all(&mut file, &buffer) {
            // The file may now end in a partial record; never append to it again.
            abandon(&file);
            self.revisit_cache.clear();
            return Err(err);
        }
        for (key, entry) in revisits {
            self.revisit_cache.insert(key, entry);
        }

        if file.size > self.options.max_size {
            debug!(path = %file.path.display(), size = file.size, "WARC passed size limit");
            self.current = Some(file);
            self.close()?;
        } else {
            self.current = Some(file);
        }
        Ok(())
    }

    /// Close the open file, if any, and forget every cached revisit target.
    pub fn close(&mut self) -> Result<()> {
        self.revisit_cache.clear();
        if let Some(mut file) = self.current.take() {
            file.writer.flush().or_raise(|| ErrorKind::Write(file.path.clone()))?;
            info!(path = %file.path.display(), size = file.size, "Closed WARC");
        }
        Ok(())
    }

    fn encode(&self, record: &Record) -> Result<(Vec<u8>, Option<String>)> {
        let encoded = record.encode()?;
        let mut bytes = Vec::with_capacity(encoded.bytes.len());
        self.options
            .compression
            .compress_into(&encoded.bytes, &mut bytes)
            .or_raise(|| ErrorKind::Encode(record.record_id().to_string()))?;
        Ok((bytes, encoded.payload_digest))
    }

    fn next_path(&mut self, date: OffsetDateTime) -> Result<PathBuf> {
        let base = format!("{}{}", self.options.name, file_suffix(date)?);
        let count = self.created_names.entry(base.clone()).or_insert(0);
        *count += 1;
        let base = if *count > 1 { format!("{base}-{count}") } else { base };
        Ok(PathBuf::from(format!("{base}.warc{}", self.options.compression.extension())))
    }

    async fn open(&mut self, date: OffsetDateTime) -> Result<OpenFile> {
        self.close()?;
        let path = self.next_path(date)?;
        if self.backend.exists(&path).await.or_raise(|| ErrorKind::Create(path.clone()))? {
            warn!(path = %path.display(), "Overwriting existing WARC file");
        }
        info!(path = %path.display(), backend = self.backend.name(), "Creating WARC");
        let writer = self.backend.writer(&path).await.or_raise(|| ErrorKind::Create(path.clone()))?;
        let mut file = OpenFile { path, writer, size: 0 };
        self.files.push(file.path.clone());

        let file_name = file.path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
        let mut info = WarcFields::new()
            .with("software", SOFTWARE)
            .with("format", format!("WARC file version {WARC_VERSION}"));
        info.extend(self.options.info.iter());
        let now = OffsetDateTime::now_utc();
        let created = now.replace_nanosecond(0).unwrap_or(now);
        let (bytes, _) = self.encode(&Record::warcinfo(file_name, created, &info))?;
        if let Err(err) = write_all(&mut file, &bytes) {
            abandon(&file);
            return Err(err);
        }
        Ok(file)
    }
}

fn abandon(file: &OpenFile) {
    warn!(path = %file.path.display(), size = file.size, "Write failed; WARC may end in an incomplete record");
}

fn write_all(file: &mut OpenFile, bytes: &[u8]) -> Result<()> {
    file.writer
        .write_all(bytes)
        .and_then(|()| file.writer.flush())
        .or_raise(|| ErrorKind::Write(file.path.clone()))?;
    file.size += bytes.len() as u64;
    Ok(())
}
