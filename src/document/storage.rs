//! Per-module storage handle.

use std::fs;
use std::path::{Path, PathBuf};

use crate::file_store;
use crate::module::{ModuleDescriptor, PathResolver, StorageModule};
use crate::provision::StorageRoot;

use super::bucket::DateBucket;
use super::collection::DocumentCollection;
use super::errors::DocumentResult;

/// A module's provisioned directory and the collections inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStorage {
    dir: PathBuf,
}

impl ModuleStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage for a registered module
    pub fn for_descriptor(root: &StorageRoot, descriptor: &ModuleDescriptor) -> Self {
        Self::new(root.module_dir(descriptor.path()))
    }

    /// Storage for `M`, resolved with the default naming convention
    pub fn for_module<M: StorageModule>(root: &StorageRoot) -> Self {
        Self::new(root.module_dir(&PathResolver::default().resolve(M::IDENTITY)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every document the module owns, across all buckets
    pub fn collection(&self) -> DocumentCollection {
        DocumentCollection::new(&self.dir)
    }

    /// Documents of one day. The bucket directory is created on first write.
    pub fn bucket(&self, bucket: DateBucket) -> DocumentCollection {
        DocumentCollection::new(self.dir.join(bucket.name()))
    }

    /// Existing day buckets, oldest first. Other entries are ignored.
    pub fn buckets(&self) -> DocumentResult<Vec<DateBucket>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(file_store::FileStoreError::io(&self.dir, e).into()),
        };

        let mut buckets: Vec<DateBucket> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().to_str().and_then(DateBucket::parse))
            .collect();
        buckets.sort();
        Ok(buckets)
    }

    /// Total bytes on disk, best effort
    pub fn size(&self) -> u64 {
        file_store::size_of(&self.dir).unwrap_or(0)
    }
}
