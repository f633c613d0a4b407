//! Storage operations
//!
//! Blocking filesystem work for a single stored file. These run inside the
//! storage executor's workers, one call per unit of work.

use log::{error, info, warn};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::error::StorageError;
use crate::storage::paths::FilePath;

const MAX_RETRIES: usize = 3;

/// Creates the base directory and any missing ancestors.
pub fn ensure_directory(path: &Path) -> Result<(), StorageError> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path)
        .map_err(|e| StorageError::DirectoryCreationFailed(path.display().to_string(), e))
}

/// Writes `content` to the target file, replacing anything already there.
///
/// The owner directory is created on demand. The file is truncated on open
/// and the whole buffer is written in one pass.
pub fn write_file(target: &FilePath, content: &[u8]) -> Result<(), StorageError> {
    ensure_directory(&target.owner_dir).inspect_err(|e| warn!("{}", e))?;

    let mut file = File::create(&target.file).inspect_err(|e| {
        error!("Failed to create {}: {}", target.file.display(), e);
    })?;

    file.write_all(content).inspect_err(|e| {
        error!("Failed to write {}: {}", target.file.display(), e);
    })?;
    file.flush()?;

    info!(
        "Stored {} bytes at {}",
        content.len(),
        target.file.display()
    );
    Ok(())
}

/// Reads a stored file fully into memory.
pub fn read_file(path: &Path) -> Result<Vec<u8>, StorageError> {
    if !path.exists() {
        warn!("File not found: {}", path.display());
        return Err(StorageError::FileNotFound(path.display().to_string()));
    }

    fs::read(path).map_err(|e| {
        error!("Failed to read {}: {}", path.display(), e);
        StorageError::from(e)
    })
}

/// Removes a stored file.
pub fn remove_file(path: &Path) -> Result<(), StorageError> {
    if !path.is_file() {
        return Err(StorageError::FileNotFound(path.display().to_string()));
    }

    // Delete with retries for permission issues
    for attempt in 1..=MAX_RETRIES {
        match fs::remove_file(path) {
            Ok(()) => {
                info!("Deleted {}", path.display());
                return Ok(());
            }
            Err(e) if attempt < MAX_RETRIES && e.kind() == std::io::ErrorKind::PermissionDenied => {
                thread::sleep(Duration::from_millis(100 * attempt as u64));
            }
            Err(e) => {
                error!("Failed to delete {}: {}", path.display(), e);
                return Err(StorageError::from(e));
            }
        }
    }

    Err(StorageError::IoError(std::io::Error::other(
        "Failed to delete file after retries",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_creates_owner_directory() {
        let base = tempdir().unwrap();
        let target = FilePath::resolve(base.path(), "5-report").unwrap();

        write_file(&target, b"hello").unwrap();

        assert!(base.path().join("5").is_dir());
        assert_eq!(fs::read(base.path().join("5").join("5-report")).unwrap(), b"hello");
    }

    #[test]
    fn test_write_truncates_previous_content() {
        let base = tempdir().unwrap();
        let target = FilePath::resolve(base.path(), "5-report").unwrap();

        write_file(&target, b"a much longer first version").unwrap();
        write_file(&target, b"short").unwrap();

        assert_eq!(read_file(&target.file).unwrap(), b"short");
    }

    #[test]
    fn test_write_fails_when_owner_dir_is_a_file() {
        let base = tempdir().unwrap();
        fs::write(base.path().join("9"), b"not a directory").unwrap();
        let target = FilePath::resolve(base.path(), "9-x").unwrap();

        assert!(matches!(
            write_file(&target, b"data"),
            Err(StorageError::DirectoryCreationFailed(_, _))
        ));
    }

    #[test]
    fn test_read_and_remove_missing_file() {
        let base = tempdir().unwrap();
        let missing = base.path().join("1").join("1-missing");

        assert!(matches!(read_file(&missing), Err(StorageError::FileNotFound(_))));
        assert!(matches!(remove_file(&missing), Err(StorageError::FileNotFound(_))));
    }

    #[test]
    fn test_remove_existing_file() {
        let base = tempdir().unwrap();
        let target = FilePath::resolve(base.path(), "3-doc").unwrap();
        write_file(&target, b"bye").unwrap();

        remove_file(&target.file).unwrap();
        assert!(!target.file.exists());
        // Owner directory is left in place
        assert!(target.owner_dir.is_dir());
    }
}
