//! Timestamp formats used in WARC headers, HTTP headers and file names.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

// RFC 7231 IMF-fixdate, always in GMT.
const HTTP_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT");
const FILE_SUFFIX: &[BorrowedFormatItem<'static>] =
    format_description!("--[year]-[month]-[day]T[hour][minute][second]");

/// `WARC-Date` value: RFC 3339 in UTC, using the compact `Z` designator.
pub fn warc_date(time: OffsetDateTime) -> Result<String> {
    time.to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .or_raise(|| ErrorKind::InvalidDate(time.to_string()))
}

/// HTTP `Date` header value, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn http_date(time: OffsetDateTime) -> Result<String> {
    time.to_offset(UtcOffset::UTC)
        .format(HTTP_DATE)
        .or_raise(|| ErrorKind::InvalidDate(time.to_string()))
}

/// Suffix appended to a series name for a file whose first record was
/// captured at `time`, e.g. `--2017-03-01T120000`.
pub fn file_suffix(time: OffsetDateTime) -> Result<String> {
    time.to_offset(UtcOffset::UTC)
        .format(FILE_SUFFIX)
        .or_raise(|| ErrorKind::InvalidDate(time.to_string()))
}
