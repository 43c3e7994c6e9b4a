//! Convert Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::fmt::{Display as FmtDisplay, Formatter, Result as FmtResult};

/// A conversion error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a Version was left out of the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    /// The capture has no HTTP status code.
    MissingStatus,
    /// The response body was never stored, or is gone.
    MissingBody,
    /// The stored body doesn't hash to the recorded digest.
    MismatchedBodyData,
    /// Anything else, when the run was told to skip unexpected errors.
    Unknown,
}
impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingStatus => "Missing_status",
            Self::MissingBody => "Body_never_saved",
            Self::MismatchedBodyData => "Mismatched_body_data",
            Self::Unknown => "Unknown",
        }
    }
}
impl FmtDisplay for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The Version can't be archived; skip it and carry on.
    #[display("{message} (version={version_id})")]
    BadData {
        version_id: String,
        reason: SkipReason,
        message: String,
    },
    /// The recorded status code has no meaning in HTTP.
    #[display("invalid HTTP status {status} (version={version_id})")]
    InvalidStatus { version_id: String, status: u16 },
    /// The response body could not be downloaded.
    #[display("failed to load response body (version={_0})")]
    Fetch(#[error(not(source))] String),
    /// A record could not be built from the Version's data.
    #[display("failed to build records (version={_0})")]
    Record(#[error(not(source))] String),
    /// The Version's records could not be written.
    #[display("failed to write records (version={_0})")]
    Write(#[error(not(source))] String),
    /// Processing a Version failed in a way that stops the run.
    #[display("error processing version {_0}")]
    Version(#[error(not(source))] String),
    /// The list of Versions could not be read.
    #[display("failed to list versions")]
    Source,
    /// The last WARC file could not be finished.
    #[display("failed to close WARC series")]
    Close,
}

impl ErrorKind {
    pub(crate) fn bad_data(version_id: &str, reason: SkipReason, message: impl Into<String>) -> Self {
        Self::BadData { version_id: version_id.to_string(), reason, message: message.into() }
    }

    /// The reason tag for errors that only mean "skip this Version".
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::BadData { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SkipReason::MissingStatus, "Missing_status")]
    #[case(SkipReason::MissingBody, "Body_never_saved")]
    #[case(SkipReason::MismatchedBodyData, "Mismatched_body_data")]
    #[case(SkipReason::Unknown, "Unknown")]
    fn test_reason_tags(#[case] reason: SkipReason, #[case] tag: &str) {
        assert_eq!(reason.to_string(), tag);
    }

    #[test]
    fn test_bad_data_message() {
        let kind = ErrorKind::bad_data("abc", SkipReason::MissingStatus, "Missing status code");
        assert_eq!(kind.to_string(), "Missing status code (version=abc)");
        assert_eq!(kind.skip_reason(), Some(SkipReason::MissingStatus));
        assert_eq!(ErrorKind::Source.skip_reason(), None);
    }
}
