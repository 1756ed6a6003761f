//! File store error types
//!
//! Every failing operation reports the path it was working on. Precondition
//! failures are raised before the filesystem is touched.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for file store operations
pub type FileStoreResult<T> = Result<T, FileStoreError>;

/// File store errors
#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Path is not readable: {}: {reason}", .path.display())]
    NotReadable { path: PathBuf, reason: String },

    #[error("Path exists but is read-only: {}", .0.display())]
    NotWritable(PathBuf),

    #[error("Path exists but is a directory: {}", .0.display())]
    AlreadyIsDirectory(PathBuf),

    #[error("Path exists but is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Destination already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Source '{}' and destination '{}' are the same file", .src.display(), .dst.display())]
    SameFile { src: PathBuf, dst: PathBuf },

    #[error("Source '{}' and destination '{}' are the same directory", .src.display(), .dst.display())]
    SamePath { src: PathBuf, dst: PathBuf },

    #[error(
        "Incomplete copy from '{}' to '{}': expected {expected} bytes, found {actual}",
        .src.display(),
        .dst.display()
    )]
    IncompleteCopy {
        src: PathBuf,
        dst: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("Cannot move directory '{}' into its own descendant '{}'", .src.display(), .dst.display())]
    InvalidNesting { src: PathBuf, dst: PathBuf },

    #[error("Failed to delete '{}' after copy to '{}': {reason}", .src.display(), .dst.display())]
    DeleteAfterCopyFailed {
        src: PathBuf,
        dst: PathBuf,
        reason: String,
    },

    #[error("Copy of '{}' failed with {} error(s); first: {}", .src.display(), .failures.len(), first_failure(.failures))]
    CopyFailed {
        src: PathBuf,
        failures: Vec<FileStoreError>,
    },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn first_failure(failures: &[FileStoreError]) -> String {
    failures
        .first()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl FileStoreError {
    /// Wraps an OS-level error with the path it occurred at
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Maps an OS-level error, turning `NotFound` into the typed variant
    pub(crate) fn from_io(path: impl AsRef<Path>, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.as_ref().to_path_buf()),
            _ => Self::io(path, source),
        }
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "FS_NOT_FOUND",
            Self::NotReadable { .. } => "FS_NOT_READABLE",
            Self::NotWritable(_) => "FS_NOT_WRITABLE",
            Self::AlreadyIsDirectory(_) => "FS_ALREADY_IS_DIRECTORY",
            Self::NotADirectory(_) => "FS_NOT_A_DIRECTORY",
            Self::AlreadyExists(_) => "FS_ALREADY_EXISTS",
            Self::SameFile { .. } => "FS_SAME_FILE",
            Self::SamePath { .. } => "FS_SAME_PATH",
            Self::IncompleteCopy { .. } => "FS_INCOMPLETE_COPY",
            Self::InvalidNesting { .. } => "FS_INVALID_NESTING",
            Self::DeleteAfterCopyFailed { .. } => "FS_DELETE_AFTER_COPY_FAILED",
            Self::CopyFailed { .. } => "FS_COPY_FAILED",
            Self::Io { .. } => "FS_IO_FAILURE",
        }
    }

    /// Returns true if this error means the path does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
