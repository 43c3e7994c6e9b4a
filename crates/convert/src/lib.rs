//! Turns Web Monitoring Versions into WARC records.
//!
//! [`ChainTranslator`] builds the records for one Version: a synthetic
//! redirect for each hop of its capture history, the final response (or a
//! revisit of an identical earlier body) and a metadata record per hop.
//! [`convert`] drives a whole [`VersionSource`](vwarc_source::VersionSource)
//! through the translator into a [`WarcSeries`](vwarc_warc::WarcSeries),
//! skipping and counting Versions that can't be archived.

mod driver;
pub mod error;
#[cfg(test)]
mod testing;
mod translate;

pub use crate::driver::{ConvertOptions, Summary, convert};
pub use crate::error::SkipReason;
pub use crate::translate::{ChainTranslator, capture_history, status_text};
