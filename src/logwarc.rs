//! WARC files holding a conversion run's log.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::{info, instrument};
use vwarc_compress::Compression;
use vwarc_storage::StorageBackend;
use vwarc_warc::{Record, RecordType, WARC_VERSION, WarcFields, file_suffix};

/// Log file looked for when given a directory.
pub const LOG_FILE: &str = "log.txt";

const SOFTWARE: &str = concat!("versionista-warc/", env!("CARGO_PKG_VERSION"));
const OPERATOR: &str = r#""Environmental Data & Governance Initiative" <contact@envirodatagov.org>"#;
const DESCRIPTION: &str = "Log file listing notices and warnings when generating WARCs of web content \
    captured by EDGI's Web Monitoring project using Versionista (https://versionista.com).";

/// The log file `path` refers to: itself, or `log.txt` inside it.
pub fn log_file(path: &Path) -> PathBuf {
    if path.is_dir() { path.join(LOG_FILE) } else { path.to_path_buf() }
}

/// Write `<stem>--<modified>.warc[.gz]` next to `log`, holding a `warcinfo`
/// record and the log itself as a `text/plain` resource.
///
/// `log` is relative to the backend root. Returns the new file's path.
#[instrument(skip(backend), fields(backend = backend.name()))]
pub async fn create_log_warc(backend: &dyn StorageBackend, log: &Path, compression: Compression) -> Result<PathBuf> {
    let missing = || ErrorKind::LogMissing(log.to_path_buf());
    let stat = backend.stat(log).await.or_raise(missing)?;
    let body = backend.read(log).await.or_raise(missing)?;

    let stem = log.file_stem().and_then(|stem| stem.to_str()).unwrap_or("log");
    let suffix = file_suffix(stat.modified).or_raise(missing)?;
    let file_name = format!("{stem}{suffix}.warc{}", compression.extension());
    let path = log.with_file_name(&file_name);
    let failed = || ErrorKind::LogWarc(path.clone());

    let info = WarcFields::new()
        .with("software", SOFTWARE)
        .with("format", format!("WARC file version {WARC_VERSION}"))
        .with("operator", OPERATOR)
        .with("description", DESCRIPTION);
    let records = [
        Record::warcinfo(&file_name, OffsetDateTime::now_utc(), &info),
        Record::new(RecordType::Resource, stat.modified).with_content_type("text/plain").with_payload(body),
    ];

    let mut output = Vec::new();
    for record in &records {
        let encoded = record.encode().or_raise(failed)?;
        compression.compress_into(&encoded.bytes, &mut output).or_raise(failed)?;
    }
    backend.write(&path, &output).await.or_raise(failed)?;
    info!(path = %path.display(), size = output.len(), "Wrote log WARC");
    Ok(path)
}
