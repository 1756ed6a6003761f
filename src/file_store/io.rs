//! Whole-file reads and writes, directory creation, and the streaming copy
//! primitive shared by copy and move.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::errors::{FileStoreError, FileStoreResult};
use super::inspect::path_exists;

/// Buffer size used when streaming file contents.
pub(crate) const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reads the whole file at `path`.
///
/// # Errors
///
/// - `NotFound` if nothing exists at `path`
/// - `NotReadable` if `path` is a directory or cannot be opened
pub fn read(path: &Path) -> FileStoreResult<Vec<u8>> {
    let meta = fs::metadata(path).map_err(|e| FileStoreError::from_io(path, e))?;
    if meta.is_dir() {
        return Err(FileStoreError::NotReadable {
            path: path.to_path_buf(),
            reason: "path is a directory".into(),
        });
    }

    let mut file = File::open(path).map_err(|e| FileStoreError::NotReadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut data = Vec::with_capacity(meta.len() as usize);
    file.read_to_end(&mut data)
        .map_err(|e| FileStoreError::io(path, e))?;
    Ok(data)
}

/// Reads the whole file at `path` as UTF-8 text.
pub fn read_to_string(path: &Path) -> FileStoreResult<String> {
    let data = read(path)?;
    String::from_utf8(data).map_err(|e| FileStoreError::NotReadable {
        path: path.to_path_buf(),
        reason: format!("invalid UTF-8: {}", e.utf8_error()),
    })
}

/// Writes `data` to `path`, replacing or appending to existing contents.
///
/// Missing parent directories are created first.
///
/// # Errors
///
/// - `AlreadyIsDirectory` if `path` names an existing directory
/// - `NotWritable` if `path` exists and is read-only
pub fn write(path: &Path, data: &[u8], append: bool) -> FileStoreResult<()> {
    if let Ok(meta) = fs::metadata(path) {
        if meta.is_dir() {
            return Err(FileStoreError::AlreadyIsDirectory(path.to_path_buf()));
        }
        if meta.permissions().readonly() {
            return Err(FileStoreError::NotWritable(path.to_path_buf()));
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(|e| FileStoreError::io(path, e))?;
    file.write_all(data)
        .map_err(|e| FileStoreError::io(path, e))?;
    file.flush().map_err(|e| FileStoreError::io(path, e))?;

    debug!(path = %path.display(), bytes = data.len(), append, "wrote file");
    Ok(())
}

/// Creates `dir` and any missing ancestors.
///
/// Succeeds if the directory already exists, including when another process
/// created it between the check and the call.
///
/// Trailing separators are ignored, so `file/` is reported as occupied by
/// `file` rather than surfacing the platform's ENOTDIR.
///
/// # Errors
///
/// - `NotADirectory` if a non-directory already occupies `dir`
/// - `Io` if `dir` cannot be inspected or created
pub fn create_dir_all(dir: &Path) -> FileStoreResult<()> {
    let dir: PathBuf = dir.components().collect();
    match fs::metadata(&dir) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => return Err(FileStoreError::NotADirectory(dir)),
        Err(e) if e.kind() != ErrorKind::NotFound => return Err(FileStoreError::io(&dir, e)),
        Err(_) => {}
    }

    if let Err(e) = fs::create_dir_all(&dir) {
        if !dir.is_dir() {
            if path_exists(&dir) {
                return Err(FileStoreError::NotADirectory(dir));
            }
            return Err(FileStoreError::io(&dir, e));
        }
    }
    Ok(())
}

/// Streams `src` into `dst` (truncating it) through a fixed-size buffer.
///
/// Both handles are closed when this returns, on every path.
pub(crate) fn stream_copy(src: &Path, dst: &Path) -> FileStoreResult<u64> {
    let mut input = File::open(src).map_err(|e| FileStoreError::from_io(src, e))?;
    let mut output = File::create(dst).map_err(|e| FileStoreError::io(dst, e))?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut copied: u64 = 0;
    loop {
        let n = input
            .read(&mut buffer)
            .map_err(|e| FileStoreError::io(src, e))?;
        if n == 0 {
            break;
        }
        output
            .write_all(&buffer[..n])
            .map_err(|e| FileStoreError::io(dst, e))?;
        copied += n as u64;
    }
    output.flush().map_err(|e| FileStoreError::io(dst, e))?;
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a").join("b").join("doc.json");

        write(&path, b"{}", false).unwrap();
        assert_eq!(read(&path).unwrap(), b"{}");
    }

    #[test]
    fn test_write_append() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("log.txt");

        write(&path, b"one\n", false).unwrap();
        write(&path, b"two\n", true).unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "one\ntwo\n");

        write(&path, b"three\n", false).unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "three\n");
    }

    #[test]
    fn test_write_onto_directory_rejected() {
        let temp = TempDir::new().unwrap();
        let result = write(temp.path(), b"x", false);
        assert!(matches!(result, Err(FileStoreError::AlreadyIsDirectory(_))));
    }

    #[test]
    fn test_write_read_only_rejected_and_unchanged() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("locked.json");
        fs::write(&path, b"original").unwrap();

        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms).unwrap();

        let result = write(&path, b"changed", false);
        assert!(matches!(result, Err(FileStoreError::NotWritable(_))));
        assert_eq!(fs::read(&path).unwrap(), b"original");
    }

    #[test]
    fn test_read_missing_and_directory() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            read(&temp.path().join("missing")),
            Err(FileStoreError::NotFound(_))
        ));
        assert!(matches!(
            read(temp.path()),
            Err(FileStoreError::NotReadable { .. })
        ));
    }

    #[test]
    fn test_create_dir_all_over_file() {
        let temp = TempDir::new().unwrap();
        let occupied = temp.path().join("occupied");
        fs::write(&occupied, b"not a dir").unwrap();

        assert!(matches!(
            create_dir_all(&occupied),
            Err(FileStoreError::NotADirectory(_))
        ));
        create_dir_all(&temp.path().join("x").join("y")).unwrap();
        create_dir_all(&temp.path().join("x").join("y")).unwrap();
    }

    /// A trailing separator does not hide the file occupying the path.
    #[test]
    fn test_create_dir_all_trailing_separator_over_file() {
        let temp = TempDir::new().unwrap();
        let occupied = temp.path().join("occupied");
        fs::write(&occupied, b"not a dir").unwrap();
        let mut with_slash = occupied.clone().into_os_string();
        with_slash.push(std::path::MAIN_SEPARATOR_STR);

        match create_dir_all(Path::new(&with_slash)) {
            Err(FileStoreError::NotADirectory(path)) => assert_eq!(path, occupied),
            other => panic!("expected NotADirectory, got {:?}", other),
        }
        assert!(occupied.is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_create_dir_all_under_file_is_not_treated_as_missing() {
        let temp = TempDir::new().unwrap();
        let occupied = temp.path().join("occupied");
        fs::write(&occupied, b"not a dir").unwrap();

        // metadata of occupied/sub fails with ENOTDIR, not NotFound
        let result = create_dir_all(&occupied.join("sub"));
        assert!(result.is_err());
        assert!(occupied.is_file());
    }

    #[test]
    fn test_stream_copy_larger_than_buffer() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.bin");
        let dst = temp.path().join("dst.bin");
        let data: Vec<u8> = (0..(COPY_BUFFER_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &data).unwrap();

        let copied = stream_copy(&src, &dst).unwrap();
        assert_eq!(copied, data.len() as u64);
        assert_eq!(fs::read(&dst).unwrap(), data);
    }
}
