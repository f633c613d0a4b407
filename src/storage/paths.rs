//! Path resolution
//!
//! Maps file identifiers of the form `<ownerId>-<suffix>` to owner-scoped
//! locations under the node's base path.

use std::path::{Path, PathBuf};

use crate::error::PathError;

/// Extracts the owner id from a file identifier.
///
/// The owner id is everything before the first `-` and must parse as a
/// non-negative signed 64-bit integer, so ids above `i64::MAX` are rejected.
/// The suffix is not inspected.
pub fn resolve_owner(file_id: &str) -> Result<u64, PathError> {
    let malformed = || PathError::MalformedIdentifier(file_id.to_string());
    match file_id.find('-') {
        Some(idx) if idx > 0 => file_id[..idx]
            .parse::<i64>()
            .ok()
            .and_then(|id| u64::try_from(id).ok())
            .ok_or_else(malformed),
        _ => Err(malformed()),
    }
}

/// Directory holding every file of one owner: `<base>/<ownerId>`
pub fn owner_directory(base_path: &Path, owner_id: u64) -> PathBuf {
    base_path.join(owner_id.to_string())
}

/// Location of a stored file: `<base>/<ownerId>/<fileId>`.
///
/// The full identifier, owner prefix included, is the final segment.
pub fn file_path(base_path: &Path, owner_id: u64, file_id: &str) -> PathBuf {
    owner_directory(base_path, owner_id).join(file_id)
}

/// Fully resolved storage location for one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePath {
    pub owner_id: u64,
    pub owner_dir: PathBuf,
    pub file: PathBuf,
}

impl FilePath {
    pub fn resolve(base_path: &Path, file_id: &str) -> Result<Self, PathError> {
        let owner_id = resolve_owner(file_id)?;
        Ok(Self {
            owner_id,
            owner_dir: owner_directory(base_path, owner_id),
            file: file_path(base_path, owner_id, file_id),
        })
    }
}
