//! WARC 1.1 records and size-rotated WARC series.
//!
//! - [`Record`] describes one logical WARC record and knows how to serialize
//!   itself (headers, HTTP block, digests).
//! - [`RevisitCache`] remembers which record first stored a given payload so
//!   later identical payloads can be written as `revisit` records.
//! - [`WarcSeries`] writes batches of records into a sequence of files on a
//!   [storage backend](vwarc_storage), starting a new file whenever the
//!   current one passes a target size.

mod date;
mod digest;
pub mod error;
mod fields;
mod record;
mod revisit;
mod series;

pub use crate::date::{file_suffix, http_date, warc_date};
pub use crate::digest::{sha256_hex, warc_digest};
pub use crate::fields::WarcFields;
pub use crate::record::{Encoded, HttpHeaders, Record, RecordType};
pub use crate::revisit::{RevisitCache, RevisitEntry};
pub use crate::series::{SeriesOptions, WarcSeries};

/// WARC format version written into every record.
pub const WARC_VERSION: &str = "1.1";
/// Bytes in a gigabyte, as used for size thresholds.
pub const GIGABYTE: u64 = 1024 * 1024 * 1024;
/// Profile URI for revisits that point at an identical payload.
pub const REVISIT_PROFILE: &str = "http://netpreserve.org/warc/1.1/revisit/identical-payload-digest";
