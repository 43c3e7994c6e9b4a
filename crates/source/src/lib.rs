//! Versions and response bodies from EDGI's Web Monitoring database.
//!
//! - [`VersionSource`] yields [`Version`]s; [`DbClient`] pages through the
//!   database API to do so.
//! - [`BodyFetcher`] loads the raw response body a Version points at;
//!   [`HttpFetcher`] does so over HTTP, retrying transient failures.

mod db;
pub mod error;
mod fetch;
mod models;
mod retry;
#[cfg(test)]
mod testing;

pub use crate::db::{Credentials, DbClient, VersionQuery, VersionSource, VersionStream};
pub use crate::fetch::{BodyFetcher, HttpFetcher};
pub use crate::models::{SourceMetadata, Version};
pub use crate::retry::RetryPolicy;

/// Default API location of the Web Monitoring database.
pub const DEFAULT_DB_URL: &str = "https://api.monitoring.envirodatagov.org";

const USER_AGENT: &str = concat!("versionista-warc/", env!("CARGO_PKG_VERSION"));
