//! File and directory copies.
//!
//! A copy never targets its own source: identical canonical paths are
//! rejected, and copying a directory into one of its own subdirectories
//! excludes the entries the copy itself produces.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};

use super::errors::{FileStoreError, FileStoreResult};
use super::inspect::{canonical_path, is_symlink, path_exists};
use super::io::{create_dir_all, stream_copy};

/// Entry filter for directory copies; returns true for entries to copy.
///
/// Applied at every level of the walk, to files and directories alike.
pub type CopyFilter<'a> = &'a dyn Fn(&Path) -> bool;

/// Copies the file `src` to `dst`.
///
/// Missing ancestors of `dst` are created. When `preserve_timestamps` is set
/// the source's modification time is applied to the destination.
///
/// # Errors
///
/// - `NotFound` if `src` does not exist
/// - `AlreadyIsDirectory` if `src` or `dst` is a directory
/// - `SameFile` if both resolve to the same file (nothing is written)
/// - `NotWritable` if `dst` exists and is read-only
/// - `IncompleteCopy` if the destination size differs after the copy
pub fn copy_file(src: &Path, dst: &Path, preserve_timestamps: bool) -> FileStoreResult<()> {
    let src_meta = fs::metadata(src).map_err(|e| FileStoreError::from_io(src, e))?;
    if src_meta.is_dir() {
        return Err(FileStoreError::AlreadyIsDirectory(src.to_path_buf()));
    }
    if canonical_path(src)? == canonical_path(dst)? {
        return Err(FileStoreError::SameFile {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
        });
    }
    if let Ok(dst_meta) = fs::metadata(dst) {
        if dst_meta.is_dir() {
            return Err(FileStoreError::AlreadyIsDirectory(dst.to_path_buf()));
        }
        if dst_meta.permissions().readonly() {
            return Err(FileStoreError::NotWritable(dst.to_path_buf()));
        }
    }
    if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }

    do_copy_file(src, dst, preserve_timestamps)
}

/// Copies the file `src` into `dst_dir`, keeping its file name.
pub fn copy_file_to_directory(
    src: &Path,
    dst_dir: &Path,
    preserve_timestamps: bool,
) -> FileStoreResult<()> {
    if path_exists(dst_dir) && !dst_dir.is_dir() {
        return Err(FileStoreError::NotADirectory(dst_dir.to_path_buf()));
    }
    let name = src
        .file_name()
        .ok_or_else(|| FileStoreError::NotFound(src.to_path_buf()))?;
    copy_file(src, &dst_dir.join(name), preserve_timestamps)
}

fn do_copy_file(src: &Path, dst: &Path, preserve_timestamps: bool) -> FileStoreResult<()> {
    if dst.is_dir() {
        return Err(FileStoreError::AlreadyIsDirectory(dst.to_path_buf()));
    }

    stream_copy(src, dst)?;

    let expected = fs::metadata(src)
        .map_err(|e| FileStoreError::from_io(src, e))?
        .len();
    let actual = fs::metadata(dst)
        .map_err(|e| FileStoreError::from_io(dst, e))?
        .len();
    if expected != actual {
        return Err(FileStoreError::IncompleteCopy {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            expected,
            actual,
        });
    }

    if preserve_timestamps {
        let modified = fs::metadata(src)
            .and_then(|m| m.modified())
            .map_err(|e| FileStoreError::io(src, e))?;
        File::options()
            .write(true)
            .open(dst)
            .and_then(|f| f.set_modified(modified))
            .map_err(|e| FileStoreError::io(dst, e))?;
    }
    Ok(())
}

/// Recursively copies the directory `src` to `dst`.
///
/// If `dst` lies inside `src`, the destination paths of `src`'s immediate
/// children are computed before the walk starts and never copied from, so the
/// copy terminates and does not duplicate itself. Symlinked entries are
/// recreated as links and never followed.
///
/// A failure inside the walk abandons that subtree only; the remaining
/// entries are still copied and all failures are returned together.
///
/// # Errors
///
/// - `NotFound` if `src` does not exist
/// - `NotADirectory` if `src` is not a directory
/// - `SamePath` if `src` and `dst` resolve to the same directory
/// - `CopyFailed` carrying every failure met during the walk
pub fn copy_directory(
    src: &Path,
    dst: &Path,
    filter: Option<CopyFilter<'_>>,
    preserve_timestamps: bool,
) -> FileStoreResult<()> {
    let src_meta = fs::metadata(src).map_err(|e| FileStoreError::from_io(src, e))?;
    if !src_meta.is_dir() {
        return Err(FileStoreError::NotADirectory(src.to_path_buf()));
    }

    let canonical_src = canonical_path(src)?;
    let canonical_dst = canonical_path(dst)?;
    if canonical_src == canonical_dst {
        return Err(FileStoreError::SamePath {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
        });
    }

    let mut exclusions = Vec::new();
    if canonical_dst.starts_with(&canonical_src) {
        exclusions.push(canonical_dst.clone());
        for child in list_children(src, filter)? {
            if let Some(name) = child.file_name() {
                exclusions.push(canonical_path(&dst.join(name))?);
            }
        }
        debug!(
            src = %src.display(),
            dst = %dst.display(),
            excluded = exclusions.len(),
            "copying directory into itself"
        );
    }

    let mut failures = Vec::new();
    let walk = DirectoryCopy {
        filter,
        preserve_timestamps,
        exclusions: &exclusions,
    };
    walk.copy(src, dst, &mut failures);

    if failures.is_empty() {
        Ok(())
    } else {
        warn!(src = %src.display(), failures = failures.len(), "directory copy incomplete");
        Err(FileStoreError::CopyFailed {
            src: src.to_path_buf(),
            failures,
        })
    }
}

/// Copies `src` into `dst_parent/<name of src>`.
pub fn copy_directory_to_directory(
    src: &Path,
    dst_parent: &Path,
    preserve_timestamps: bool,
) -> FileStoreResult<()> {
    if path_exists(src) && !src.is_dir() {
        return Err(FileStoreError::NotADirectory(src.to_path_buf()));
    }
    if path_exists(dst_parent) && !dst_parent.is_dir() {
        return Err(FileStoreError::NotADirectory(dst_parent.to_path_buf()));
    }
    let name = src
        .file_name()
        .ok_or_else(|| FileStoreError::NotFound(src.to_path_buf()))?;
    copy_directory(src, &dst_parent.join(name), None, preserve_timestamps)
}

fn list_children(dir: &Path, filter: Option<CopyFilter<'_>>) -> FileStoreResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| FileStoreError::NotReadable {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut children = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FileStoreError::io(dir, e))?;
        let path = entry.path();
        if filter.map_or(true, |accept| accept(&path)) {
            children.push(path);
        }
    }
    Ok(children)
}

struct DirectoryCopy<'a> {
    filter: Option<CopyFilter<'a>>,
    preserve_timestamps: bool,
    exclusions: &'a [PathBuf],
}

impl DirectoryCopy<'_> {
    fn copy(&self, src: &Path, dst: &Path, failures: &mut Vec<FileStoreError>) {
        // Listed before the destination exists so a nested destination is
        // not part of its own listing.
        let children = match list_children(src, self.filter) {
            Ok(children) => children,
            Err(e) => {
                failures.push(e);
                return;
            }
        };

        if let Err(e) = create_dir_all(dst) {
            failures.push(e);
            return;
        }
        match fs::metadata(dst) {
            Ok(meta) if meta.permissions().readonly() => {
                failures.push(FileStoreError::NotWritable(dst.to_path_buf()));
                return;
            }
            Ok(_) => {}
            Err(e) => {
                failures.push(FileStoreError::io(dst, e));
                return;
            }
        }

        for child in children {
            let Some(name) = child.file_name() else {
                continue;
            };
            match canonical_path(&child) {
                Ok(canonical) if self.exclusions.contains(&canonical) => continue,
                Ok(_) => {}
                Err(e) => {
                    failures.push(e);
                    continue;
                }
            }

            let target = dst.join(name);
            match is_symlink(&child) {
                Ok(true) => {
                    if let Err(e) = copy_link(&child, &target) {
                        failures.push(e);
                    }
                }
                Ok(false) if child.is_dir() => self.copy(&child, &target, failures),
                Ok(false) => {
                    if let Err(e) = do_copy_file(&child, &target, self.preserve_timestamps) {
                        failures.push(e);
                    }
                }
                Err(e) => failures.push(e),
            }
        }

        if self.preserve_timestamps {
            // Directory handles cannot carry timestamps on every platform.
            if let Err(e) = copy_modified_time(src, dst) {
                debug!(dst = %dst.display(), error = %e, "directory timestamp not preserved");
            }
        }
    }
}

fn copy_modified_time(src: &Path, dst: &Path) -> std::io::Result<()> {
    let modified: SystemTime = fs::metadata(src)?.modified()?;
    File::open(dst)?.set_modified(modified)
}

#[cfg(unix)]
fn copy_link(src: &Path, dst: &Path) -> FileStoreResult<()> {
    let target = fs::read_link(src).map_err(|e| FileStoreError::io(src, e))?;
    if path_exists(dst) {
        return Err(FileStoreError::AlreadyExists(dst.to_path_buf()));
    }
    std::os::unix::fs::symlink(&target, dst).map_err(|e| FileStoreError::io(dst, e))
}

#[cfg(not(unix))]
fn copy_link(src: &Path, dst: &Path) -> FileStoreResult<()> {
    do_copy_file(src, dst, false)
}
