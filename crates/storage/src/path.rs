//! Storage path validation.
//!
//! Output names come from user configuration (`out/archive` and friends), so
//! every path handed to a backend is normalized here first and rejected if it
//! would escape the backend's root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Normalizes a relative storage path, rejecting anything that climbs above
/// the storage root, contains null bytes, or resolves to nothing.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use vwarc_storage::validate_path;
///
/// assert!(validate_path("out/archive.warc.gz").is_ok());
/// assert!(validate_path("../etc/passwd").is_err());
/// assert_eq!(
///     validate_path("./out//drafts/../archive.warc/").unwrap(),
///     Path::new("out/archive.warc")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let mut components = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes survive Path::components() on Unix but truncate
                // the path once it reaches a syscall.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(original.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
            },
        }
    }
    if components.is_empty() {
        exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
    }
    Ok(components.into_iter().collect())
}
