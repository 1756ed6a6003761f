//! # Document Errors

use std::path::PathBuf;

use thiserror::Error;

use crate::file_store::FileStoreError;

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Document access errors
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid document id: {0:?}")]
    InvalidId(String),

    #[error("Failed to decode document {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to encode document {id}: {reason}")]
    Encode { id: String, reason: String },

    #[error("Failed to walk {}: {reason}", .path.display())]
    Walk { path: PathBuf, reason: String },

    #[error(transparent)]
    FileStore(FileStoreError),
}

impl From<FileStoreError> for DocumentError {
    fn from(err: FileStoreError) -> Self {
        match err {
            FileStoreError::NotFound(path) => DocumentError::NotFound(path),
            other => DocumentError::FileStore(other),
        }
    }
}

impl DocumentError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            DocumentError::NotFound(_) => 404,
            DocumentError::InvalidId(_) => 400,
            DocumentError::Decode { .. } | DocumentError::Encode { .. } => 500,
            DocumentError::Walk { .. } => 500,
            DocumentError::FileStore(FileStoreError::AlreadyExists(_)) => 409,
            DocumentError::FileStore(_) => 500,
        }
    }
}
