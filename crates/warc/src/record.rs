//! Logical WARC records and their serialization.

use crate::digest::warc_digest;
use crate::error::Result;
use crate::fields::WarcFields;
use crate::revisit::RevisitEntry;
use crate::{REVISIT_PROFILE, WARC_VERSION, date::warc_date};
use std::fmt::{Display, Formatter, Result as FmtResult};
use time::OffsetDateTime;

const HTTP_PROTOCOL: &str = "HTTP/1.1";
const HTTP_CONTENT_TYPE: &str = "application/http; msgtype=response";
const FIELDS_CONTENT_TYPE: &str = "application/warc-fields";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Warcinfo,
    Response,
    Resource,
    Revisit,
    Metadata,
}
impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warcinfo => "warcinfo",
            Self::Response => "response",
            Self::Resource => "resource",
            Self::Revisit => "revisit",
            Self::Metadata => "metadata",
        }
    }
}
impl Display for RecordType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Status line and headers of a recorded HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeaders {
    /// Status code and reason phrase, e.g. `302 Found`.
    status: String,
    headers: Vec<(String, String)>,
}
impl HttpHeaders {
    pub fn new(status: impl Into<String>) -> Self {
        Self { status: status.into(), headers: Vec::new() }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Replace the value of an existing header (case-insensitive) in place,
    /// or append it.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(&name)) {
            Some((_, existing)) => *existing = value.into(),
            None => self.headers.push((name, value.into())),
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Full status line as written into the record.
    pub fn status_line(&self) -> String {
        format!("{HTTP_PROTOCOL} {}", self.status)
    }

    /// Value of the first header called `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(|(name, _)| name.as_str())
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut output = format!("{}\r\n", self.status_line());
        for (name, value) in &self.headers {
            output.push_str(name);
            output.push_str(": ");
            output.push_str(value);
            output.push_str("\r\n");
        }
        output.push_str("\r\n");
        output.into_bytes()
    }
}

/// Result of serializing a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// Complete record: version line, headers, block and trailing CRLFs.
    pub bytes: Vec<u8>,
    /// The `WARC-Payload-Digest` written, if any.
    pub payload_digest: Option<String>,
}

/// One logical WARC record.
///
/// Built once with the `with_*` methods and then only read; the series
/// writer serializes it exactly once via [`encode`](Self::encode).
///
/// # Examples
///
/// ```
/// use time::OffsetDateTime;
/// use vwarc_warc::{HttpHeaders, Record, RecordType};
///
/// let record = Record::new(RecordType::Response, OffsetDateTime::UNIX_EPOCH)
///     .with_target_uri("https://www.epa.gov/")
///     .with_http(HttpHeaders::new("200 OK").with("Content-Type", "text/html"))
///     .with_payload(b"<html></html>".to_vec());
/// let encoded = record.encode().unwrap();
/// assert!(encoded.bytes.starts_with(b"WARC/1.1\r\nWARC-Type: response\r\n"));
/// assert!(encoded.payload_digest.unwrap().starts_with("sha256:"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    record_type: RecordType,
    record_id: String,
    date: OffsetDateTime,
    target_uri: Option<String>,
    fields: WarcFields,
    content_type: Option<String>,
    http: Option<HttpHeaders>,
    payload: Option<Vec<u8>>,
    /// Supplied digest for records that don't carry their payload (revisits).
    payload_digest: Option<String>,
    revisit_key: Option<String>,
}

impl Record {
    /// New record with a random `urn:uuid` record ID.
    pub fn new(record_type: RecordType, date: OffsetDateTime) -> Self {
        Self {
            record_type,
            record_id: format!("<urn:uuid:{}>", uuid::Uuid::new_v4()),
            date,
            target_uri: None,
            fields: WarcFields::new(),
            content_type: None,
            http: None,
            payload: None,
            payload_digest: None,
            revisit_key: None,
        }
    }

    /// The file-level record that opens every WARC file.
    pub fn warcinfo(filename: impl Into<String>, date: OffsetDateTime, info: &WarcFields) -> Self {
        Self::new(RecordType::Warcinfo, date)
            .with_header("WARC-Filename", filename)
            .with_fields(info)
    }

    /// A `metadata` record carrying `fields` as its payload.
    pub fn metadata(target_uri: impl Into<String>, date: OffsetDateTime, fields: &WarcFields) -> Self {
        Self::new(RecordType::Metadata, date).with_target_uri(target_uri).with_fields(fields)
    }

    /// A `revisit` record pointing at the record described by `original`.
    pub fn revisit(target_uri: impl Into<String>, date: OffsetDateTime, original: &RevisitEntry) -> Result<Self> {
        let mut record = Self::new(RecordType::Revisit, date)
            .with_target_uri(target_uri)
            .with_header("WARC-Profile", REVISIT_PROFILE)
            .with_header("WARC-Refers-To", &original.record_id)
            .with_header("WARC-Refers-To-Target-URI", &original.target_uri)
            .with_header("WARC-Refers-To-Date", warc_date(original.date)?);
        record.payload_digest = Some(original.payload_digest.clone());
        Ok(record)
    }

    pub fn with_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = record_id.into();
        self
    }

    pub fn with_target_uri(mut self, target_uri: impl Into<String>) -> Self {
        self.target_uri = Some(target_uri.into());
        self
    }

    /// Add an extra WARC header (written after the standard ones).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(name, value);
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_http(mut self, http: HttpHeaders) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Ask the series writer to remember this record under `key` once it has
    /// been written, so identical payloads can become revisits.
    pub fn cache_as(mut self, key: impl Into<String>) -> Self {
        self.revisit_key = Some(key.into());
        self
    }

    fn with_fields(self, fields: &WarcFields) -> Self {
        self.with_content_type(FIELDS_CONTENT_TYPE).with_payload(fields.to_bytes())
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn date(&self) -> OffsetDateTime {
        self.date
    }

    pub fn target_uri(&self) -> Option<&str> {
        self.target_uri.as_deref()
    }

    /// Value of an extra WARC header set with [`with_header`](Self::with_header).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.fields.get(name)
    }

    pub fn content_type(&self) -> Option<&str> {
        match self.http {
            Some(_) => Some(HTTP_CONTENT_TYPE),
            None => self.content_type.as_deref(),
        }
    }

    pub fn http(&self) -> Option<&HttpHeaders> {
        self.http.as_ref()
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    pub fn revisit_key(&self) -> Option<&str> {
        self.revisit_key.as_deref()
    }

    /// Serialize to WARC bytes, computing block and payload digests.
    pub fn encode(&self) -> Result<Encoded> {
        let mut block = self.http.as_ref().map(HttpHeaders::to_bytes).unwrap_or_default();
        if let Some(payload) = &self.payload {
            block.extend_from_slice(payload);
        }

        let payload_digest = match self.record_type {
            RecordType::Response | RecordType::Resource => {
                Some(warc_digest(self.payload.as_deref().unwrap_or_default()))
            },
            RecordType::Revisit => self.payload_digest.clone(),
            RecordType::Warcinfo | RecordType::Metadata => None,
        };

        let mut headers = WarcFields::new()
            .with("WARC-Type", self.record_type.as_str())
            .with("WARC-Record-ID", &self.record_id)
            .with("WARC-Date", warc_date(self.date)?);
        if let Some(target_uri) = &self.target_uri {
            headers.push("WARC-Target-URI", target_uri);
        }
        headers.extend(self.fields.iter());
        if let Some(content_type) = self.content_type() {
            headers.push("Content-Type", content_type);
        }
        if let Some(digest) = &payload_digest {
            headers.push("WARC-Payload-Digest", digest);
        }
        if !block.is_empty() {
            headers.push("WARC-Block-Digest", warc_digest(&block));
        }
        headers.push("Content-Length", block.len().to_string());

        let header_bytes = headers.to_bytes();
        let mut bytes = Vec::with_capacity(WARC_VERSION.len() + header_bytes.len() + block.len() + 12);
        bytes.extend_from_slice(format!("WARC/{WARC_VERSION}\r\n").as_bytes());
        bytes.extend_from_slice(&header_bytes);
        bytes.extend_from_slice(b"\r\n");
        bytes.extend_from_slice(&block);
        bytes.extend_from_slice(b"\r\n\r\n");
        Ok(Encoded { bytes, payload_digest })
    }
}
