//! Moves: atomic rename first, copy-then-delete when rename is not possible.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::copy::{copy_directory, copy_file};
use super::delete::{delete_quietly, delete_recursive};
use super::errors::{FileStoreError, FileStoreResult};
use super::inspect::{canonical_path, path_exists};
use super::io::create_dir_all;

/// Moves the file `src` to `dst`.
///
/// # Errors
///
/// - `NotFound` if `src` does not exist
/// - `AlreadyIsDirectory` if `src` is a directory
/// - `AlreadyExists` if anything exists at `dst`
/// - `DeleteAfterCopyFailed` if the fallback copy succeeded but `src` could
///   not be removed; `src` is intact, so the copy at `dst` is removed again
pub fn move_file(src: &Path, dst: &Path) -> FileStoreResult<()> {
    let meta = fs::metadata(src).map_err(|e| FileStoreError::from_io(src, e))?;
    if meta.is_dir() {
        return Err(FileStoreError::AlreadyIsDirectory(src.to_path_buf()));
    }
    if path_exists(dst) {
        return Err(FileStoreError::AlreadyExists(dst.to_path_buf()));
    }

    if let Err(e) = fs::rename(src, dst) {
        debug!(src = %src.display(), dst = %dst.display(), error = %e, "rename failed, copying");
        copy_file(src, dst, true)?;
        if let Err(e) = fs::remove_file(src) {
            delete_quietly(dst);
            return Err(FileStoreError::DeleteAfterCopyFailed {
                src: src.to_path_buf(),
                dst: dst.to_path_buf(),
                reason: e.to_string(),
            });
        }
    }
    Ok(())
}

/// Moves the directory `src` to `dst`.
///
/// Moving a directory below itself is rejected before anything is touched.
///
/// # Errors
///
/// - `NotFound` if `src` does not exist
/// - `NotADirectory` if `src` is not a directory
/// - `AlreadyExists` if anything exists at `dst`
/// - `InvalidNesting` if `dst` lies inside `src`
/// - `CopyFailed` if the fallback copy was incomplete; the partial copy at
///   `dst` is removed and `src` is untouched
/// - `DeleteAfterCopyFailed` if the fallback copy succeeded but `src` could
///   not be fully removed; the copy at `dst` is removed only if `src` is
///   still whole
pub fn move_directory(src: &Path, dst: &Path) -> FileStoreResult<()> {
    let meta = fs::metadata(src).map_err(|e| FileStoreError::from_io(src, e))?;
    if !meta.is_dir() {
        return Err(FileStoreError::NotADirectory(src.to_path_buf()));
    }
    if path_exists(dst) {
        return Err(FileStoreError::AlreadyExists(dst.to_path_buf()));
    }
    if canonical_path(dst)?.starts_with(canonical_path(src)?) {
        return Err(FileStoreError::InvalidNesting {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
        });
    }

    if let Err(e) = fs::rename(src, dst) {
        debug!(src = %src.display(), dst = %dst.display(), error = %e, "rename failed, copying");
        move_directory_by_copy(src, dst, delete_recursive)?;
    }
    Ok(())
}

/// Copy-then-delete half of [`move_directory`].
///
/// If the source cannot be removed the copy is dropped again only while the
/// source is still whole. Once anything has gone from the source, the copy
/// at `dst` is the only complete one and is kept.
pub(crate) fn move_directory_by_copy<F>(src: &Path, dst: &Path, remove_src: F) -> FileStoreResult<()>
where
    F: FnOnce(&Path) -> FileStoreResult<u64>,
{
    if let Err(e) = copy_directory(src, dst, None, true) {
        if !delete_quietly(dst) {
            warn!(dst = %dst.display(), "partial copy left behind");
        }
        return Err(e);
    }

    let entries_before = count_entries(src);
    let removal = remove_src(src).map_err(|e| e.to_string()).and_then(|_| {
        if path_exists(src) {
            Err("source still present after delete".to_string())
        } else {
            Ok(())
        }
    });
    if let Err(reason) = removal {
        if count_entries(src) == entries_before {
            debug!(src = %src.display(), "source untouched, dropping copy");
            delete_quietly(dst);
        } else {
            warn!(src = %src.display(), dst = %dst.display(), %reason, "source partly removed, keeping copy");
        }
        return Err(FileStoreError::DeleteAfterCopyFailed {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            reason,
        });
    }
    Ok(())
}

fn count_entries(dir: &Path) -> usize {
    WalkDir::new(dir).into_iter().filter_map(Result::ok).count()
}

/// Moves a file or directory into `dst_dir`, keeping its name.
///
/// With `create_dst_dir` a missing `dst_dir` is created first.
pub fn move_to_directory(src: &Path, dst_dir: &Path, create_dst_dir: bool) -> FileStoreResult<()> {
    if !path_exists(src) {
        return Err(FileStoreError::NotFound(src.to_path_buf()));
    }
    if !path_exists(dst_dir) {
        if !create_dst_dir {
            return Err(FileStoreError::NotFound(dst_dir.to_path_buf()));
        }
        create_dir_all(dst_dir)?;
    }
    if !dst_dir.is_dir() {
        return Err(FileStoreError::NotADirectory(dst_dir.to_path_buf()));
    }

    let name = src
        .file_name()
        .ok_or_else(|| FileStoreError::NotFound(src.to_path_buf()))?;
    let dst = dst_dir.join(name);
    if src.is_dir() {
        move_directory(src, &dst)
    } else {
        move_file(src, &dst)
    }
}
