//! Binary Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    /// A client, backend or writer could not be set up.
    #[display("failed to set up {_0}")]
    Setup(#[error(not(source))] &'static str),
    #[display("conversion failed")]
    Convert,
    #[display("no log file found at {}", _0.display())]
    LogMissing(#[error(not(source))] PathBuf),
    #[display("failed to write log WARC {}", _0.display())]
    LogWarc(#[error(not(source))] PathBuf),
}
