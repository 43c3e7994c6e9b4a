use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// One captured version of a page, as stored in the Web Monitoring database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub uuid: String,
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub capture_time: OffsetDateTime,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub media_type: Option<String>,
    /// Response headers recorded at capture time. Some were added by the
    /// capturing service rather than the original server.
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub body_url: Option<String>,
    /// Lowercase hex SHA-256 of the response body.
    #[serde(default)]
    pub body_hash: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source_metadata: Option<SourceMetadata>,
}

impl Version {
    /// Redirect entries exactly as stored; may hold nulls or junk.
    pub fn redirects(&self) -> &[Value] {
        self.source_metadata.as_ref().and_then(|meta| meta.redirects.as_deref()).unwrap_or_default()
    }

    /// The page at the capturing service this Version was imported from.
    pub fn source_url(&self) -> Option<&str> {
        self.source_metadata.as_ref().and_then(|meta| meta.url.as_deref()).filter(|url| !url.is_empty())
    }
}

/// Service-specific data attached to a Version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub redirects: Option<Vec<Value>>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}
