//! Stand-ins for the database and body storage.

use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use time::macros::datetime;
use vwarc_source::error::{ErrorKind as SourceErrorKind, Result as SourceResult};
use vwarc_source::{BodyFetcher, SourceMetadata, Version, VersionQuery, VersionSource, VersionStream};
use vwarc_warc::sha256_hex;

/// A Version of `http://epa.gov` whose stored body is `body`.
pub(crate) fn version(id: &str, body: &[u8]) -> Version {
    Version {
        uuid: id.to_string(),
        url: "http://epa.gov".to_string(),
        capture_time: datetime!(2017-03-01 12:00:00 UTC),
        status: Some(200),
        media_type: Some("text/html".to_string()),
        headers: None,
        body_url: Some(format!("https://storage.example/{id}")),
        body_hash: Some(sha256_hex(body)),
        title: Some("Climate Change | US EPA".to_string()),
        source_metadata: Some(SourceMetadata {
            url: Some("https://versionista.com/74273/6210778/".to_string()),
            ..SourceMetadata::default()
        }),
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeFetcher {
    bodies: HashMap<String, Vec<u8>>,
    failing: bool,
    calls: Arc<AtomicUsize>,
}
impl FakeFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn for_version(version: &Version, body: &[u8]) -> Self {
        Self::new().with_body(version.body_url.as_deref().unwrap_or_default(), body)
    }

    pub(crate) fn with_body(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }

    /// Every fetch fails the way an unreachable server would.
    pub(crate) fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BodyFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> SourceResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            exn::bail!(SourceErrorKind::Network(url.to_string()));
        }
        match self.bodies.get(url) {
            Some(body) => Ok(body.clone()),
            None => exn::bail!(SourceErrorKind::NotFound(url.to_string())),
        }
    }
}

/// Yields its Versions in order, optionally failing after the first `fail_after`.
pub(crate) struct FakeSource {
    versions: Vec<Version>,
    fail_after: Option<usize>,
}
impl FakeSource {
    pub(crate) fn new(versions: Vec<Version>) -> Self {
        Self { versions, fail_after: None }
    }

    pub(crate) fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }
}

impl VersionSource for FakeSource {
    fn versions<'a>(&'a self, _query: &VersionQuery) -> VersionStream<'a> {
        let limit = self.fail_after.unwrap_or(self.versions.len());
        let mut items: Vec<SourceResult<Version>> = self.versions.iter().take(limit).cloned().map(Ok).collect();
        if self.fail_after.is_some() {
            items.push(Err(exn::Exn::from(SourceErrorKind::Status { url: "db".to_string(), status: 500 })));
        }
        futures::stream::iter(items).boxed()
    }
}
