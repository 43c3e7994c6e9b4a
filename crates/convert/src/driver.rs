//! Runs Versions through the translator and into a WARC series.

use crate::error::{ErrorKind, Result, SkipReason};
use crate::translate::ChainTranslator;
use exn::ResultExt;
use futures::StreamExt;
use std::collections::BTreeMap;
use tracing::{error, info, instrument, warn};
use vwarc_source::{VersionQuery, VersionSource};
use vwarc_warc::WarcSeries;

const PROGRESS_EVERY: usize = 1_000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Versions to pass over before converting anything.
    pub start: usize,
    /// Versions to convert after `start`, or all of them.
    pub limit: Option<usize>,
    /// Count unexpected per-Version errors as [`SkipReason::Unknown`] instead
    /// of stopping.
    pub skip_errors: bool,
}

/// What happened during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Versions taken from the source, skipped ones included.
    pub processed: usize,
    /// Versions whose records were written.
    pub written: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}
impl Summary {
    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_default() += 1;
    }
}

/// Convert every Version from `source` and write it to `series`.
///
/// Versions with bad data are skipped and counted in `summary`. The series is
/// closed whether or not the run succeeds, so `summary` and the files written
/// so far stay usable after an error.
#[instrument(skip_all, fields(start = options.start, limit = options.limit))]
pub async fn convert(
    source: &dyn VersionSource,
    query: &VersionQuery,
    translator: &ChainTranslator,
    series: &mut WarcSeries,
    options: &ConvertOptions,
    summary: &mut Summary,
) -> Result<()> {
    let result = run(source, query, translator, series, options, summary).await;
    let closed = series.close().or_raise(|| ErrorKind::Close);
    result?;
    closed?;
    info!(
        processed = summary.processed,
        written = summary.written,
        skipped = summary.total_skipped(),
        "Finished converting versions"
    );
    Ok(())
}

async fn run(
    source: &dyn VersionSource,
    query: &VersionQuery,
    translator: &ChainTranslator,
    series: &mut WarcSeries,
    options: &ConvertOptions,
    summary: &mut Summary,
) -> Result<()> {
    let mut versions = source.versions(query);
    let mut position = 0;
    while let Some(item) = versions.next().await {
        let version = item.or_raise(|| ErrorKind::Source)?;
        position += 1;
        if position <= options.start {
            continue;
        }
        if options.limit.is_some_and(|limit| summary.processed >= limit) {
            break;
        }
        summary.processed += 1;

        let outcome = match translator.translate(&version, series.revisit_cache()).await {
            Ok(records) => series.write_records(records).await.or_raise(|| ErrorKind::Write(version.uuid.clone())),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(()) => summary.written += 1,
            Err(err) => match err.skip_reason() {
                Some(reason) => {
                    warn!(version = %version.uuid, %reason, "Skipping version: {}", &*err);
                    summary.skip(reason);
                },
                None if options.skip_errors => {
                    error!(version = %version.uuid, error = ?err, "Skipping version after unexpected error");
                    summary.skip(SkipReason::Unknown);
                },
                None => return Err(err).or_raise(|| ErrorKind::Version(version.uuid.clone())),
            },
        }

        if summary.processed % PROGRESS_EVERY == 0 {
            info!(
                processed = summary.processed,
                written = summary.written,
                skipped = summary.total_skipped(),
                "Converting versions"
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeFetcher, FakeSource, version};
    use serde_json::json;
    use std::path::Path;
    use std::sync::Arc;
    use vwarc_compress::Compression;
    use vwarc_source::Version;
    use vwarc_storage::backend::{MockBackend, StorageBackend};
    use vwarc_warc::SeriesOptions;

    const PUBLIC: &str = "https://api.monitoring.envirodatagov.org";

    struct Harness {
        backend: MockBackend,
        series: WarcSeries,
        translator: ChainTranslator,
        fetcher: FakeFetcher,
    }

    fn harness(fetcher: FakeFetcher, max_size: u64) -> Harness {
        harness_on(MockBackend::default(), fetcher, max_size)
    }

    fn harness_on(backend: MockBackend, fetcher: FakeFetcher, max_size: u64) -> Harness {
        let options = SeriesOptions {
            name: "archive".to_string(),
            compression: Compression::None,
            max_size,
            revisit_cache_size: 100,
            ..SeriesOptions::default()
        };
        let series = WarcSeries::new(Arc::new(backend.clone()), options);
        let translator = ChainTranslator::new(Arc::new(fetcher.clone()), PUBLIC);
        Harness { backend, series, translator, fetcher }
    }

    impl Harness {
        async fn run(&mut self, versions: Vec<Version>, options: ConvertOptions) -> (Result<()>, Summary) {
            let source = FakeSource::new(versions);
            self.run_source(&source, options).await
        }

        async fn run_source(&mut self, source: &FakeSource, options: ConvertOptions) -> (Result<()>, Summary) {
            let mut summary = Summary::default();
            let result = convert(
                source,
                &VersionQuery::default(),
                &self.translator,
                &mut self.series,
                &options,
                &mut summary,
            )
            .await;
            (result, summary)
        }

        async fn text(&self, path: &Path) -> String {
            String::from_utf8(self.backend.read(path).await.unwrap()).unwrap()
        }
    }

    fn count(text: &str, needle: &str) -> usize {
        text.matches(needle).count()
    }

    #[tokio::test]
    async fn test_identical_bodies_become_revisits() {
        let first = version("v1", b"same body");
        let second = version("v2", b"same body");
        let mut h = harness(FakeFetcher::for_version(&first, b"same body"), u64::MAX);

        let (result, summary) = h.run(vec![first, second], ConvertOptions::default()).await;
        result.unwrap();
        assert_eq!(summary.written, 2);
        assert_eq!(h.fetcher.calls(), 1);

        let files = h.series.files().to_vec();
        assert_eq!(files.len(), 1);
        let text = h.text(&files[0]).await;
        assert_eq!(count(&text, "WARC-Type: response"), 1);
        assert_eq!(count(&text, "WARC-Type: revisit"), 1);
        assert!(text.contains(&format!("WARC-Refers-To: <{PUBLIC}/api/v0/versions/v1/responses/0>\r\n")));
        // The series is closed at the end of the run.
        assert!(h.series.current().is_none());
        assert!(h.series.revisit_cache().is_empty());
    }

    #[tokio::test]
    async fn test_chain_is_never_split_across_files() {
        let mut chained = version("v1", b"chained");
        chained.url = "http://a.example/".to_string();
        chained.source_metadata.as_mut().unwrap().redirects = Some(vec![json!("https://b.example/")]);
        let other = version("v2", b"other");
        let fetcher = FakeFetcher::for_version(&chained, b"chained").with_body(other.body_url.as_deref().unwrap(), b"other");
        // Any write at all passes this size, so every Version gets its own file.
        let mut h = harness(fetcher, 1);

        let (result, summary) = h.run(vec![chained, other], ConvertOptions::default()).await;
        result.unwrap();
        assert_eq!(summary.written, 2);

        let files = h.series.files().to_vec();
        assert_eq!(files.len(), 2);
        let first = h.text(&files[0]).await;
        assert_eq!(count(&first, "WARC-Type: response"), 2);
        assert_eq!(count(&first, "WARC-Type: metadata"), 2);
        assert!(first.contains("Location: https://b.example/\r\n"));
        let second = h.text(&files[1]).await;
        assert_eq!(count(&second, "WARC-Type: response"), 1);
        assert!(second.starts_with("WARC/1.1\r\nWARC-Type: warcinfo\r\n"));
    }

    #[tokio::test]
    async fn test_bad_versions_are_counted() {
        let good = version("good", b"fine");
        let mut no_status = version("no-status", b"x");
        no_status.status = None;
        let mut no_body = version("no-body", b"x");
        no_body.body_url = None;
        let gone = version("gone", b"x");
        let mismatched = version("mismatched", b"expected");
        let fetcher = FakeFetcher::for_version(&good, b"fine")
            .with_body(mismatched.body_url.as_deref().unwrap(), b"something else");
        let mut h = harness(fetcher, u64::MAX);

        let (result, summary) =
            h.run(vec![good, no_status, no_body, gone, mismatched], ConvertOptions::default()).await;
        result.unwrap();
        assert_eq!(summary.processed, 5);
        assert_eq!(summary.written, 1);
        assert_eq!(summary.total_skipped(), 4);
        assert_eq!(
            summary.skipped,
            BTreeMap::from([
                (SkipReason::MissingStatus, 1),
                (SkipReason::MissingBody, 2),
                (SkipReason::MismatchedBodyData, 1),
            ])
        );
    }

    #[tokio::test]
    async fn test_unexpected_error_stops_run() {
        let mut h = harness(FakeFetcher::new().failing(), u64::MAX);
        let (result, summary) = h.run(vec![version("v1", b"x"), version("v2", b"y")], ConvertOptions::default()).await;
        let err = result.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Version(id) if id == "v1"));
        assert_eq!(summary.processed, 1);
        assert!(h.series.files().is_empty());
    }

    #[tokio::test]
    async fn test_skip_errors_counts_unknown() {
        let mut h = harness(FakeFetcher::new().failing(), u64::MAX);
        let options = ConvertOptions { skip_errors: true, ..ConvertOptions::default() };
        let (result, summary) = h.run(vec![version("v1", b"x"), version("v2", b"y")], options).await;
        result.unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped, BTreeMap::from([(SkipReason::Unknown, 2)]));
    }

    #[tokio::test]
    async fn test_skip_errors_covers_write_failures() {
        let (first, second) = (version("v1", b"one"), version("v2", b"two"));
        let fetcher = FakeFetcher::for_version(&first, b"one").with_body(second.body_url.as_deref().unwrap(), b"two");
        // Too small for even the warcinfo record.
        let mut h = harness_on(MockBackend::default().with_max_file_size(16), fetcher, u64::MAX);
        let options = ConvertOptions { skip_errors: true, ..ConvertOptions::default() };

        let (result, summary) = h.run(vec![first, second], options).await;
        result.unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.written, 0);
        assert_eq!(summary.skipped, BTreeMap::from([(SkipReason::Unknown, 2)]));
        assert_eq!(h.series.files().len(), 2);
    }

    #[tokio::test]
    async fn test_write_failure_stops_run() {
        let v = version("v1", b"one");
        let fetcher = FakeFetcher::for_version(&v, b"one");
        let mut h = harness_on(MockBackend::default().with_max_file_size(16), fetcher, u64::MAX);
        let (result, summary) = h.run(vec![v], ConvertOptions::default()).await;
        let err = result.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Version(id) if id == "v1"));
        assert_eq!(summary.written, 0);
    }

    #[tokio::test]
    async fn test_start_and_limit() {
        let versions: Vec<Version> = (0..5).map(|i| version(&format!("v{i}"), format!("body {i}").as_bytes())).collect();
        let fetcher = versions
            .iter()
            .enumerate()
            .fold(FakeFetcher::new(), |fetcher, (i, v)| {
                fetcher.with_body(v.body_url.as_deref().unwrap(), format!("body {i}").as_bytes())
            });
        let mut h = harness(fetcher, u64::MAX);
        let options = ConvertOptions { start: 1, limit: Some(2), ..ConvertOptions::default() };

        let (result, summary) = h.run(versions, options).await;
        result.unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.written, 2);
        let text = h.text(&h.series.files()[0].clone()).await;
        assert!(!text.contains("/versions/v0/"));
        assert!(text.contains("/versions/v1/responses/0"));
        assert!(text.contains("/versions/v2/responses/0"));
        assert!(!text.contains("/versions/v3/"));
    }

    #[tokio::test]
    async fn test_source_error_is_fatal_but_closes_series() {
        let v = version("v1", b"x");
        let mut h = harness(FakeFetcher::for_version(&v, b"x"), u64::MAX);
        let source = FakeSource::new(vec![v]).failing_after(1);

        let (result, summary) = h.run_source(&source, ConvertOptions::default()).await;
        let err = result.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Source));
        assert_eq!(summary.written, 1);
        assert_eq!(h.series.files().len(), 1);
        assert!(h.series.current().is_none());
    }
}
