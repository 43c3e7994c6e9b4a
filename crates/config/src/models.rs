use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use vwarc_compress::Compression;

const GIGABYTE: f64 = (1024 * 1024 * 1024) as f64;
const DEFAULT_DB_URL: &str = "https://api.monitoring.envirodatagov.org";
const OPERATOR: &str = r#""Environmental Data & Governance Initiative" <contact@envirodatagov.org>"#;
const DESCRIPTION: &str = "Web content captured by EDGI's Web Monitoring project using Versionista \
    (https://versionista.com). This WARC is synthesized from data that was originally archived extracted \
    from Versionista via https://github.com/edgi-govdata-archiving/versionista-outputter and \
    https://github.com/edgi-govdata-archiving/web-monitoring-versionista-scraper.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub database: DatabaseConfig,
    pub fetch: FetchConfig,
    /// Count unexpected per-Version failures instead of aborting the run.
    pub skip_errors: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that file names are relative to.
    pub path: PathBuf,
    /// Base name of each WARC file; may include subdirectories.
    pub name: String,
    #[serde(with = "compression")]
    pub compression: Compression,
    /// Bytes after which a WARC file is closed and a new one started.
    pub max_size: u64,
    pub revisit_cache_size: usize,
    /// Extra `warcinfo` fields written at the start of every file.
    pub info: BTreeMap<String, String>,
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            name: "edgi-wm-versionista".to_string(),
            compression: Compression::Gzip,
            max_size: (7.95 * GIGABYTE) as u64,
            revisit_cache_size: 100_000,
            info: BTreeMap::from([
                ("operator".to_string(), OPERATOR.to_string()),
                ("description".to_string(), DESCRIPTION.to_string()),
            ]),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// API location that Versions are listed from.
    pub url: String,
    /// Public API location used to build record IDs and `source` links.
    pub public_url: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub source_type: String,
    pub chunk_size: usize,
    pub timeout_secs: u64,
}
impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DB_URL.to_string(),
            public_url: DEFAULT_DB_URL.to_string(),
            email: None,
            password: None,
            source_type: "versionista".to_string(),
            chunk_size: 5_000,
            timeout_secs: 60,
        }
    }
}
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("public_url", &self.public_url)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("source_type", &self.source_type)
            .field("chunk_size", &self.chunk_size)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Retries after a failed body download.
    pub retries: u32,
    pub backoff_ms: u64,
    pub timeout_secs: u64,
}
impl Default for FetchConfig {
    fn default() -> Self {
        Self { retries: 3, backoff_ms: 500, timeout_secs: 60 }
    }
}

mod compression {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use vwarc_compress::Compression;

    pub fn serialize<S: Serializer>(value: &Compression, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Compression, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(|_| D::Error::custom(format!("unsupported WARC compression: {name}")))
    }
}
