//! Layered configuration for versionista-warc.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A configuration file: either the one passed explicitly, or
//!    `config.{toml,yaml,json}` in the user's configuration directory.
//! 3. `VWARC_*` environment variables, nested with `__`
//!    (`VWARC_OUTPUT__MAX_SIZE=1073741824`).
//! 4. The Web Monitoring database's conventional variables:
//!    `WEB_MONITORING_DB_URL`, `WEB_MONITORING_DB_EMAIL` and
//!    `WEB_MONITORING_DB_PASSWORD`.
//!
//! Command-line flags are applied on top by the binary.

pub mod error;
mod models;

pub use crate::models::{Config, DatabaseConfig, FetchConfig, OutputConfig};
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use std::path::Path;
use tracing::debug;

const ENV_PREFIX: &str = "VWARC_";
const DB_ENV: [(&str, &str); 3] = [
    ("WEB_MONITORING_DB_URL", "database.url"),
    ("WEB_MONITORING_DB_EMAIL", "database.email"),
    ("WEB_MONITORING_DB_PASSWORD", "database.password"),
];

impl Config {
    /// Every configuration source merged, without extracting or validating.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match file {
            Some(path) => figment = merge_file(figment, path),
            None => {
                if let Some(dirs) = ProjectDirs::from("org", "EDGI", "versionista-warc") {
                    for name in ["config.toml", "config.yaml", "config.json"] {
                        let path = dirs.config_dir().join(name);
                        if path.is_file() {
                            debug!(path = %path.display(), "Found configuration file");
                            figment = merge_file(figment, &path);
                        }
                    }
                }
            },
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        for (variable, key) in DB_ENV {
            figment = figment.merge(Env::raw().only(&[variable]).map(move |_| key.into()));
        }
        figment
    }

    /// Load and validate configuration from every source.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file.filter(|path| !path.is_file()) {
            exn::bail!(invalid("config", format!("no such file: {}", path.display())));
        }
        let config: Config = Self::figment(file).extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.output.name.trim().is_empty() {
            exn::bail!(invalid("output.name", "must not be empty"));
        }
        if self.output.max_size == 0 {
            exn::bail!(invalid("output.max_size", "must be greater than zero"));
        }
        if self.output.revisit_cache_size == 0 {
            exn::bail!(invalid("output.revisit_cache_size", "must be greater than zero"));
        }
        if self.database.chunk_size == 0 {
            exn::bail!(invalid("database.chunk_size", "must be greater than zero"));
        }
        for (field, url) in [("database.url", &self.database.url), ("database.public_url", &self.database.public_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                exn::bail!(invalid(field, format!("not an HTTP(S) URL: {url}")));
            }
        }
        if self.database.email.is_some() != self.database.password.is_some() {
            exn::bail!(invalid("database.password", "email and password must be set together"));
        }
        if self.fetch.timeout_secs == 0 {
            exn::bail!(invalid("fetch.timeout_secs", "must be greater than zero"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ErrorKind {
    ErrorKind::Invalid { field, reason: reason.into() }
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase).as_deref() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => figment.merge(Toml::file_exact(path)),
    }
}
