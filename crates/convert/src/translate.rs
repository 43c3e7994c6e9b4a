//! One Version in, an ordered chain of WARC records out.

use crate::error::{ErrorKind, Result, SkipReason};
use exn::{OptionExt, ResultExt};
use regex::Regex;
use reqwest::StatusCode;
use std::sync::{Arc, LazyLock};
use tracing::{instrument, warn};
use vwarc_source::error::ErrorKind as SourceErrorKind;
use vwarc_source::{BodyFetcher, Version};
use vwarc_warc::{HttpHeaders, Record, RecordType, RevisitCache, WarcFields, http_date, sha256_hex};

static URL_LIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(https?|ftp)://").unwrap());

/// Headers added by the capturing service rather than the original server.
const BAD_HEADERS: [&str; 9] = [
    "age",
    "date",
    "vary",
    "expires",
    "x-cachee",
    "connection",
    "accept-ranges",
    "cache-control",
    "transfer-encoding",
];
const REDIRECT_STATUS: &str = "302 Found";
const DEFAULT_RESOURCE_TYPE: &str = "application/octet-stream";

/// `200 OK`-style status text for a status code.
pub fn status_text(code: u16) -> Option<String> {
    let status = StatusCode::from_u16(code).ok()?;
    status.canonical_reason().map(|reason| format!("{} {reason}", status.as_u16()))
}

/// The URLs a capture went through: the requested URL, then every usable
/// redirect target. The last entry is where the body came from.
pub fn capture_history(version: &Version) -> Vec<String> {
    let mut history = vec![version.url.clone()];
    for redirect in version.redirects() {
        match redirect.as_str() {
            None | Some("") => warn!(version = %version.uuid, "Version has null redirect"),
            Some(url) if !URL_LIKE.is_match(url) => {
                warn!(version = %version.uuid, redirect = url, "Version has non-URL redirect")
            },
            Some(url) => history.push(url.to_string()),
        }
    }
    history
}

/// Builds the WARC records for a single Version.
///
/// A Version becomes, for every URL in its [capture history](capture_history),
/// one primary record followed by a `metadata` record:
///
/// - `ftp://` URLs are `resource` records carrying the body.
/// - Intermediate hops are synthetic `302 Found` responses pointing at the
///   next hop.
/// - The final hop is the real response, or a `revisit` when the revisit
///   cache already holds a record with the same body.
///
/// Primary record IDs are stable: `<{public_url}/api/v0/versions/{uuid}/responses/{index}>`.
pub struct ChainTranslator {
    fetcher: Arc<dyn BodyFetcher>,
    public_url: String,
}

impl ChainTranslator {
    pub fn new(fetcher: Arc<dyn BodyFetcher>, public_url: impl Into<String>) -> Self {
        let public_url = public_url.into().trim_end_matches('/').to_string();
        Self { fetcher, public_url }
    }

    /// Public database URL of a Version.
    pub fn version_url(&self, version_id: &str) -> String {
        format!("{}/api/v0/versions/{version_id}", self.public_url)
    }

    /// Every record for `version`, in write order, or an error and nothing.
    ///
    /// `cache` is only read; the series writer fills it once records are
    /// actually written.
    #[instrument(skip(self, version, cache), fields(version = %version.uuid))]
    pub async fn translate(&self, version: &Version, cache: &RevisitCache) -> Result<Vec<Record>> {
        let version_id = version.uuid.as_str();
        let Some(status) = version.status else {
            exn::bail!(ErrorKind::bad_data(version_id, SkipReason::MissingStatus, "Missing status code"));
        };
        let Some(body_url) = version.body_url.as_deref() else {
            exn::bail!(ErrorKind::bad_data(version_id, SkipReason::MissingBody, "Body never saved"));
        };
        let status_line = status_text(status).ok_or_raise(|| ErrorKind::InvalidStatus {
            version_id: version_id.to_string(),
            status,
        })?;
        let date = version.capture_time;
        let recorded_date = http_date(date).or_raise(|| ErrorKind::Record(version_id.to_string()))?;

        let history = capture_history(version);
        let database_url = self.version_url(version_id);
        let first_record_id = format!("<{database_url}/responses/0>");
        let final_index = history.len() - 1;
        let mut records = Vec::with_capacity(history.len() * 2);

        for (index, url) in history.iter().enumerate() {
            let record_id = format!("<{database_url}/responses/{index}>");
            let primary = if url.to_ascii_lowercase().starts_with("ftp://") {
                let media_type = version.media_type.as_deref().filter(|media_type| !media_type.is_empty());
                Record::new(RecordType::Resource, date)
                    .with_content_type(media_type.unwrap_or(DEFAULT_RESOURCE_TYPE))
                    .with_payload(self.load_body(version, body_url).await?)
            } else if index == final_index {
                let http = response_headers(version, &status_line, &recorded_date);
                let hash = version.body_hash.as_deref().filter(|hash| !hash.is_empty()).map(str::to_ascii_lowercase);
                match hash.as_deref().and_then(|hash| cache.get(hash)) {
                    Some(original) => Record::revisit(url, date, original)
                        .or_raise(|| ErrorKind::Record(version_id.to_string()))?
                        .with_http(http),
                    None => {
                        let record = Record::new(RecordType::Response, date)
                            .with_http(http)
                            .with_payload(self.load_body(version, body_url).await?);
                        match hash {
                            Some(hash) => record.cache_as(hash),
                            None => record,
                        }
                    },
                }
            } else {
                let http = HttpHeaders::new(REDIRECT_STATUS)
                    .with("Date", recorded_date.as_str())
                    .with("Location", history[index + 1].as_str());
                Record::new(RecordType::Response, date).with_http(http)
            };

            let mut primary = primary.with_id(&record_id).with_target_uri(url);
            if let Some(source_url) = version.source_url() {
                primary = primary.with_header("WARC-Source-URI", source_url);
            }
            if index > 0 {
                primary = primary.with_header("WARC-Concurrent-To", &first_record_id);
            }
            records.push(primary);

            let fields = WarcFields::new()
                .with("via", if index > 0 { history[index - 1].as_str() } else { "" })
                .with("hopsFromSeed", "R".repeat(index))
                .with("title", version.title.as_deref().unwrap_or_default())
                .with("source", database_url.as_str());
            let metadata = Record::metadata(url, date, &fields)
                .with_header("WARC-Refers-To", &record_id)
                .with_header("WARC-Concurrent-To", &first_record_id);
            records.push(metadata);
        }

        Ok(records)
    }

    /// Download the Version's body and check it against `body_hash`.
    async fn load_body(&self, version: &Version, body_url: &str) -> Result<Vec<u8>> {
        let version_id = version.uuid.as_str();
        let body = match self.fetcher.fetch(body_url).await {
            Ok(body) => body,
            Err(err) if matches!(&*err, SourceErrorKind::NotFound(_)) => {
                return Err(err).or_raise(|| ErrorKind::bad_data(version_id, SkipReason::MissingBody, "Body never saved"));
            },
            Err(err) => return Err(err).or_raise(|| ErrorKind::Fetch(version_id.to_string())),
        };

        let actual = sha256_hex(&body);
        let expected = version.body_hash.as_deref().unwrap_or_default();
        if !actual.eq_ignore_ascii_case(expected) {
            exn::bail!(ErrorKind::bad_data(
                version_id,
                SkipReason::MismatchedBodyData,
                format!("Saved body does not match expected hash\n  Expected: {expected}\n  Actual:   {actual}"),
            ));
        }
        Ok(body)
    }
}

/// Headers of the final response: `Date`, then `Content-Type`, then every
/// recorded header the capturing service didn't add itself.
fn response_headers(version: &Version, status_line: &str, recorded_date: &str) -> HttpHeaders {
    let mut headers = HttpHeaders::new(status_line).with("Date", recorded_date);
    if let Some(media_type) = version.media_type.as_deref().filter(|media_type| !media_type.is_empty()) {
        headers.set("Content-Type", media_type);
    }
    for (name, value) in version.headers.iter().flatten() {
        if !BAD_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
            headers.set(name.as_str(), value.as_str());
        }
    }
    headers
}
