//! Non-mutating path queries: canonical forms, symlink detection, sizes.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use super::errors::{FileStoreError, FileStoreResult};
use super::io::COPY_BUFFER_SIZE;

const ONE_KB: u64 = 1024;
const ONE_MB: u64 = ONE_KB * ONE_KB;
const ONE_GB: u64 = ONE_KB * ONE_MB;
const ONE_TB: u64 = ONE_KB * ONE_GB;

/// Returns true if anything (file, directory or dangling link) occupies `path`.
pub fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Resolves `path` to its absolute, symlink-free form.
///
/// Unlike [`fs::canonicalize`] the path does not need to exist: the longest
/// existing ancestor is canonicalized and the remaining components are
/// appended after lexical normalization. Used for identity and nesting
/// comparisons where the destination is usually not created yet.
pub fn canonical_path(path: &Path) -> FileStoreResult<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| FileStoreError::io(path, e))?;
    let absolute = normalize_lexically(&absolute);

    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    loop {
        match fs::canonicalize(existing) {
            Ok(resolved) => {
                let mut out = resolved;
                for part in tail.iter().rev() {
                    out.push(part);
                }
                return Ok(out);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        tail.push(name.to_os_string());
                        existing = parent;
                    }
                    _ => return Ok(absolute),
                }
            }
            Err(e) => return Err(FileStoreError::io(existing, e)),
        }
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Returns true if `candidate` is strictly inside `ancestor` (canonical forms).
pub fn is_nested_in(candidate: &Path, ancestor: &Path) -> FileStoreResult<bool> {
    let candidate = canonical_path(candidate)?;
    let ancestor = canonical_path(ancestor)?;
    Ok(candidate != ancestor && candidate.starts_with(&ancestor))
}

/// Reports whether `path` itself is a symbolic link.
///
/// The parent is canonicalized first so that links higher up the chain do not
/// make every descendant look like a link. Absent paths are not links.
/// Platforms without symlink semantics always report false.
#[cfg(unix)]
pub fn is_symlink(path: &Path) -> FileStoreResult<bool> {
    let in_canonical_dir = match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            canonical_path(parent)?.join(name)
        }
        _ => path.to_path_buf(),
    };
    match fs::symlink_metadata(&in_canonical_dir) {
        Ok(meta) => Ok(meta.file_type().is_symlink()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FileStoreError::io(path, e)),
    }
}

#[cfg(not(unix))]
pub fn is_symlink(_path: &Path) -> FileStoreResult<bool> {
    Ok(false)
}

/// Size in bytes of a file, or the recursive sum for a directory.
///
/// Symlinked children contribute zero and are never followed. Children that
/// fail with an access error are skipped so the total stays best-effort.
pub fn size_of(path: &Path) -> FileStoreResult<u64> {
    let meta = fs::metadata(path).map_err(|e| FileStoreError::from_io(path, e))?;
    if meta.is_dir() {
        Ok(size_of_directory(path))
    } else {
        Ok(meta.len())
    }
}

fn size_of_directory(dir: &Path) -> u64 {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return 0,
    };

    let mut total: u64 = 0;
    for entry in entries.flatten() {
        let child = entry.path();
        match is_symlink(&child) {
            Ok(false) => {}
            Ok(true) | Err(_) => continue,
        }
        if let Ok(size) = size_of(&child) {
            total = total.saturating_add(size);
        }
    }
    total
}

/// Compares two files byte by byte without loading either fully.
///
/// Two absent paths are equal; a directory on either side is an error.
pub fn content_equals(a: &Path, b: &Path) -> FileStoreResult<bool> {
    let a_exists = path_exists(a);
    if a_exists != path_exists(b) {
        return Ok(false);
    }
    if !a_exists {
        return Ok(true);
    }
    for p in [a, b] {
        if p.is_dir() {
            return Err(FileStoreError::AlreadyIsDirectory(p.to_path_buf()));
        }
    }

    let len_a = fs::metadata(a).map_err(|e| FileStoreError::from_io(a, e))?.len();
    let len_b = fs::metadata(b).map_err(|e| FileStoreError::from_io(b, e))?.len();
    if len_a != len_b {
        return Ok(false);
    }
    if canonical_path(a)? == canonical_path(b)? {
        return Ok(true);
    }

    let mut file_a = File::open(a).map_err(|e| FileStoreError::from_io(a, e))?;
    let mut file_b = File::open(b).map_err(|e| FileStoreError::from_io(b, e))?;
    let mut buf_a = vec![0u8; COPY_BUFFER_SIZE];
    let mut buf_b = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let read_a = read_full(&mut file_a, &mut buf_a).map_err(|e| FileStoreError::io(a, e))?;
        let read_b = read_full(&mut file_b, &mut buf_b).map_err(|e| FileStoreError::io(b, e))?;
        if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

fn read_full(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Human readable byte count, e.g. `1.5 MB`.
pub fn format_byte_size(size: u64) -> String {
    let (unit, name) = if size >= ONE_TB {
        (ONE_TB, "TB")
    } else if size >= ONE_GB {
        (ONE_GB, "GB")
    } else if size >= ONE_MB {
        (ONE_MB, "MB")
    } else if size >= ONE_KB {
        (ONE_KB, "KB")
    } else {
        return format!("{} bytes", size);
    };
    let value = size as f64 / unit as f64;
    if value.fract() == 0.0 {
        format!("{} {}", value as u64, name)
    } else {
        format!("{:.1} {}", value, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_canonical_path_of_missing_descendant() {
        let temp = TempDir::new().unwrap();
        let root = fs::canonicalize(temp.path()).unwrap();
        let missing = temp.path().join("a").join("..").join("b").join("c.json");

        assert_eq!(canonical_path(&missing).unwrap(), root.join("b").join("c.json"));
    }

    #[test]
    fn test_is_nested_in() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("src");
        fs::create_dir(&dir).unwrap();

        assert!(is_nested_in(&dir.join("child"), &dir).unwrap());
        assert!(!is_nested_in(&dir, &dir).unwrap());
        // Prefix of the name, not of the path
        assert!(!is_nested_in(&temp.path().join("src-copy"), &dir).unwrap());
    }

    #[test]
    fn test_size_of_directory_sums_children() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a"), b"12345").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub").join("b"), b"123").unwrap();

        assert_eq!(size_of(temp.path()).unwrap(), 8);
        assert_eq!(size_of(&temp.path().join("a")).unwrap(), 5);
    }

    #[test]
    fn test_size_of_missing_path() {
        let temp = TempDir::new().unwrap();
        let result = size_of(&temp.path().join("nope"));
        assert!(matches!(result, Err(FileStoreError::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_children_contribute_zero() {
        let temp = TempDir::new().unwrap();
        let outside = temp.path().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("big"), vec![0u8; 4096]).unwrap();

        let measured = temp.path().join("measured");
        fs::create_dir(&measured).unwrap();
        fs::write(measured.join("small"), b"xy").unwrap();
        std::os::unix::fs::symlink(&outside, measured.join("link")).unwrap();

        assert!(is_symlink(&measured.join("link")).unwrap());
        assert!(!is_symlink(&measured.join("small")).unwrap());
        assert_eq!(size_of(&measured).unwrap(), 2);
    }

    #[test]
    fn test_content_equals() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        let c = temp.path().join("c");
        fs::write(&a, b"same bytes").unwrap();
        fs::write(&b, b"same bytes").unwrap();
        fs::write(&c, b"other byte").unwrap();

        assert!(content_equals(&a, &b).unwrap());
        assert!(!content_equals(&a, &c).unwrap());
        assert!(!content_equals(&a, &temp.path().join("missing")).unwrap());
    }

    #[test]
    fn test_format_byte_size() {
        assert_eq!(format_byte_size(512), "512 bytes");
        assert_eq!(format_byte_size(2048), "2 KB");
        assert_eq!(format_byte_size(ONE_MB + ONE_MB / 2), "1.5 MB");
        assert_eq!(format_byte_size(3 * ONE_GB), "3 GB");
    }
}
