//! Source Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A source error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for database and fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The server has nothing at this URL (HTTP 404).
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The server kept answering with a non-success status.
    #[display("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    /// The request could not be completed (connection, timeout, body).
    #[display("request failed: {_0}")]
    Network(#[error(not(source))] String),
    /// The response was not what the database API documents.
    #[display("unexpected response from {_0}")]
    InvalidResponse(#[error(not(source))] String),
    /// A configured or returned URL could not be parsed.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
    /// The HTTP client could not be constructed.
    #[display("failed to build HTTP client")]
    Client,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
