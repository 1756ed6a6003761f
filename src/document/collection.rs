//! Directory-backed document collections.
//!
//! A collection is a directory subtree. Every regular file anywhere beneath
//! it is one document, and a document's id is its file name without the
//! codec extension. Listing is all-or-nothing: a single unreadable or
//! undecodable document fails the whole call.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::file_store::{self, FileStoreError};

use super::codec::{DocumentCodec, JsonCodec};
use super::errors::{DocumentError, DocumentResult};

/// Documents stored as individual files under one directory
#[derive(Debug, Clone)]
pub struct DocumentCollection<C = JsonCodec> {
    dir: PathBuf,
    codec: C,
}

impl DocumentCollection<JsonCodec> {
    /// JSON collection rooted at `dir`. The directory need not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_codec(dir, JsonCodec::default())
    }
}

impl<C: DocumentCodec> DocumentCollection<C> {
    pub fn with_codec(dir: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            dir: dir.into(),
            codec,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every document file under the collection, sorted by path.
    ///
    /// A missing directory is an empty collection. Entries that vanish
    /// during the walk, and links whose target is gone, are not documents
    /// and are skipped.
    pub fn document_paths(&self) -> DocumentResult<Vec<PathBuf>> {
        match std::fs::metadata(&self.dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(FileStoreError::NotADirectory(self.dir.clone()).into()),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(FileStoreError::io(&self.dir, e).into()),
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_gone(&e) => {
                    debug!(path = ?e.path(), "skipping dangling entry");
                    continue;
                }
                Err(e) => {
                    return Err(DocumentError::Walk {
                        path: e.path().unwrap_or(&self.dir).to_path_buf(),
                        reason: e.to_string(),
                    })
                }
            };
            if !entry.file_type().is_dir() {
                paths.push(entry.into_path());
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Loads and decodes every document in the collection.
    ///
    /// # Errors
    ///
    /// The first read or decode failure aborts the listing; no partial
    /// result is returned.
    pub fn list_all<T: DeserializeOwned>(&self) -> DocumentResult<Vec<T>> {
        self.document_paths()?
            .iter()
            .map(|path| self.decode_file(path))
            .collect()
    }

    /// Number of documents, without decoding them
    pub fn count(&self) -> DocumentResult<usize> {
        Ok(self.document_paths()?.len())
    }

    /// Writes a new document. Fails with `AlreadyExists` if `id` is taken.
    pub fn insert<T: Serialize>(&self, id: &str, value: &T) -> DocumentResult<PathBuf> {
        let path = self.path_for(id)?;
        if file_store::path_exists(&path) {
            return Err(FileStoreError::AlreadyExists(path).into());
        }
        self.write_file(id, &path, value)?;
        Ok(path)
    }

    /// Writes a document, replacing any existing one with the same id
    pub fn put<T: Serialize>(&self, id: &str, value: &T) -> DocumentResult<PathBuf> {
        let path = self.path_for(id)?;
        self.write_file(id, &path, value)?;
        Ok(path)
    }

    /// Loads the document stored directly in the collection directory as `id`
    pub fn load<T: DeserializeOwned>(&self, id: &str) -> DocumentResult<T> {
        let path = self.path_for(id)?;
        self.decode_file(&path)
    }

    /// Removes the document `id`. Returns false if there was none.
    pub fn remove(&self, id: &str) -> DocumentResult<bool> {
        let path = self.path_for(id)?;
        if !file_store::path_exists(&path) {
            return Ok(false);
        }
        file_store::delete_recursive(&path)?;
        Ok(true)
    }

    fn path_for(&self, id: &str) -> DocumentResult<PathBuf> {
        let invalid = id.is_empty()
            || id == "."
            || id == ".."
            || id.contains(['/', '\\'])
            || id.contains(std::path::MAIN_SEPARATOR);
        if invalid {
            return Err(DocumentError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", id, self.codec.extension())))
    }

    fn write_file<T: Serialize>(&self, id: &str, path: &Path, value: &T) -> DocumentResult<()> {
        let bytes = self.codec.encode(value).map_err(|reason| DocumentError::Encode {
            id: id.to_string(),
            reason,
        })?;
        file_store::write(path, &bytes, false)?;
        Ok(())
    }

    fn decode_file<T: DeserializeOwned>(&self, path: &Path) -> DocumentResult<T> {
        let bytes = file_store::read(path)?;
        self.codec
            .decode(&bytes)
            .map_err(|reason| DocumentError::Decode {
                path: path.to_path_buf(),
                reason,
            })
    }
}

/// True when a walk error only means the entry (or its link target) is gone
fn is_gone(err: &walkdir::Error) -> bool {
    err.io_error()
        .map_or(false, |io| io.kind() == ErrorKind::NotFound)
}
