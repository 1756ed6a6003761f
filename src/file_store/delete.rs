//! Recursive deletion.
//!
//! Absence is the desired end state: deleting a path that does not exist
//! succeeds without touching anything.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use super::errors::{FileStoreError, FileStoreResult};
use super::inspect::is_symlink;

/// Deletes `path` and everything below it, returning the number of entries
/// removed (0 if nothing existed).
///
/// Every child is attempted even after one fails; the first failure is
/// returned once the siblings have been processed. A symlinked directory is
/// removed as a link and its target is never traversed.
///
/// # Errors
///
/// - `NotFound` if the path vanished between the checks and the final delete
/// - `Io` if an entry could not be removed
pub fn delete_recursive(path: &Path) -> FileStoreResult<u64> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(FileStoreError::io(path, e)),
    };

    if meta.is_dir() && !is_symlink(path)? {
        let removed = clean_directory(path)?;
        fs::remove_dir(path).map_err(|e| FileStoreError::from_io(path, e))?;
        debug!(path = %path.display(), removed = removed + 1, "deleted directory");
        Ok(removed + 1)
    } else {
        remove_link_or_file(path).map_err(|e| FileStoreError::from_io(path, e))?;
        Ok(1)
    }
}

/// Deletes every entry inside `dir`, keeping `dir` itself.
///
/// Returns the number of entries removed.
pub fn clean_directory(dir: &Path) -> FileStoreResult<u64> {
    let meta = fs::metadata(dir).map_err(|e| FileStoreError::from_io(dir, e))?;
    if !meta.is_dir() {
        return Err(FileStoreError::NotADirectory(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|e| FileStoreError::NotReadable {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut removed = 0;
    let mut first_error = None;
    for entry in entries {
        let result = entry
            .map_err(|e| FileStoreError::io(dir, e))
            .and_then(|entry| delete_recursive(&entry.path()));
        match result {
            Ok(count) => removed += count,
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(removed),
    }
}

/// Best-effort delete that never fails; returns true if `path` is gone.
pub fn delete_quietly(path: &Path) -> bool {
    match delete_recursive(path) {
        Ok(_) => true,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "quiet delete failed");
            false
        }
    }
}

#[cfg(windows)]
fn remove_link_or_file(path: &Path) -> io::Result<()> {
    // Directory links on Windows are removed as directories.
    fs::remove_file(path).or_else(|_| fs::remove_dir(path))
}

#[cfg(not(windows))]
fn remove_link_or_file(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_delete_missing_is_success() {
        let temp = TempDir::new().unwrap();
        assert_eq!(delete_recursive(&temp.path().join("never")).unwrap(), 0);
    }

    #[test]
    fn test_delete_single_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("doc.json");
        fs::write(&file, b"{}").unwrap();

        assert_eq!(delete_recursive(&file).unwrap(), 1);
        assert!(!file.exists());
    }

    #[test]
    fn test_clean_directory_keeps_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("bucket");
        fs::create_dir_all(dir.join("inner")).unwrap();
        fs::write(dir.join("a"), b"a").unwrap();
        fs::write(dir.join("inner").join("b"), b"b").unwrap();

        assert_eq!(clean_directory(&dir).unwrap(), 3);
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_delete_quietly() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("x");
        fs::create_dir(&dir).unwrap();
        assert!(delete_quietly(&dir));
        assert!(delete_quietly(&dir));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_contents_survive() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.json"), b"{}").unwrap();

        let doomed = temp.path().join("doomed");
        fs::create_dir(&doomed).unwrap();
        std::os::unix::fs::symlink(&target, doomed.join("link")).unwrap();

        assert_eq!(delete_recursive(&doomed).unwrap(), 2);
        assert!(!doomed.exists());
        assert!(target.join("keep.json").is_file());
    }
}
