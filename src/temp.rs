//! Temporary file management module
//!
//! This module provides RAII-based temporary file handling with automatic cleanup.
//! Files are created next to their final destination so that [`TempGuard::persist`]
//! can move them into place with a single rename.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Guard for a temporary file that is deleted on drop unless persisted
#[derive(Debug)]
pub(crate) struct TempGuard {
    path: PathBuf,
    /// Cleared once the file has been renamed to its final location
    armed: bool,
}

impl TempGuard {
    /// Get the path to the temporary file
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Moves the temporary file to `target`, replacing any existing file.
    ///
    /// After a successful rename the guard no longer owns a file and its drop
    /// is a no-op. On failure the temporary file is still cleaned up on drop.
    pub(crate) fn persist(mut self, target: &Path) -> io::Result<()> {
        fs::rename(&self.path, target)?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        if self.armed {
            // Silently ignore errors during cleanup
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Creates an empty temporary file inside `dir` and returns its guard
///
/// The file name is `.{prefix}_{ulid}.{extension}`. The leading dot keeps it
/// out of the way of anything that scans the directory for finished files,
/// and the ULID keeps concurrent temp files apart.
///
/// # Examples
///
/// ```ignore
/// let temp = create_temp_file_in(&cache_dir, "1399", "tmp")?;
/// fs::write(temp.path(), payload)?;
/// temp.persist(&cache_dir.join("1399.json"))?;
/// ```
pub(crate) fn create_temp_file_in(
    dir: &Path,
    prefix: &str,
    extension: &str,
) -> io::Result<TempGuard> {
    let ulid = ulid::Ulid::new();
    let filename = format!(".{}_{}.{}", prefix, ulid, extension);

    let path = dir.join(filename);

    File::create(&path)?;

    Ok(TempGuard { path, armed: true })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_temp_file_in() {
        let dir = tempfile::tempdir().unwrap();
        let temp = create_temp_file_in(dir.path(), "test", "txt").unwrap();
        let path = temp.path().to_path_buf();

        assert!(path.exists());
        assert!(path.is_file());
        assert_eq!(path.parent().unwrap(), dir.path());

        // Filename should contain prefix and extension
        let filename = path.file_name().unwrap().to_str().unwrap();
        assert!(filename.starts_with(".test_"));
        assert!(filename.ends_with(".txt"));

        drop(temp);

        assert!(!path.exists());
    }

    #[test]
    fn test_multiple_temp_files_unique() {
        let dir = tempfile::tempdir().unwrap();
        let temp1 = create_temp_file_in(dir.path(), "test", "txt").unwrap();
        let temp2 = create_temp_file_in(dir.path(), "test", "txt").unwrap();

        assert_ne!(temp1.path(), temp2.path());
        assert!(temp1.path().exists());
        assert!(temp2.path().exists());
    }

    #[test]
    fn test_persist_moves_file_and_disarms_guard() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("final.json");

        let temp = create_temp_file_in(dir.path(), "final", "tmp").unwrap();
        let temp_path = temp.path().to_path_buf();
        fs::write(temp.path(), "{}").unwrap();
        temp.persist(&target).unwrap();

        assert!(!temp_path.exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "{}");
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        assert!(create_temp_file_in(&missing, "test", "tmp").is_err());
    }
}
