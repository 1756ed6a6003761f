//! The storage root: the single directory all module data lives under.

use std::fs;
use std::path::{Path, PathBuf};

use crate::file_store::{self, FileStoreError};
use crate::module::ModulePath;

use super::errors::{ProvisionError, ProvisionResult};

/// Directory name of the project under the user's home
pub const PROJECT_NAME: &str = "toolboxes";

/// Absolute root directory for all module storage.
///
/// Fixed for the process lifetime once built; this crate never deletes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot {
    path: PathBuf,
}

impl StorageRoot {
    /// Uses an explicit root directory
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<home>/<PROJECT_NAME>`
    pub fn from_home() -> ProvisionResult<Self> {
        let home = dirs::home_dir().ok_or(ProvisionError::NoHomeDirectory)?;
        Ok(Self::new(home.join(PROJECT_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory owned by the module at `module_path`
    pub fn module_dir(&self, module_path: &ModulePath) -> PathBuf {
        self.path.join(module_path.as_relative())
    }

    /// Creates the root if needed and checks it can hold module directories.
    pub fn ensure(&self) -> ProvisionResult<()> {
        let unavailable = |source| ProvisionError::RootUnavailable {
            path: self.path.clone(),
            source,
        };

        file_store::create_dir_all(&self.path).map_err(unavailable)?;
        let meta = fs::metadata(&self.path).map_err(|e| unavailable(FileStoreError::io(&self.path, e)))?;
        if meta.permissions().readonly() {
            return Err(unavailable(FileStoreError::NotWritable(self.path.clone())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::resolve;
    use tempfile::TempDir;

    #[test]
    fn test_module_dir_stays_under_root() {
        let root = StorageRoot::new("/home/u/proj");
        let dir = root.module_dir(&resolve("com.x.workcenter.service.WorkCenterServiceImpl"));
        assert_eq!(
            dir,
            Path::new("/home/u/proj/com/x/workcenter/service/workcenter")
        );
        assert!(!dir.as_os_str().to_string_lossy().ends_with(std::path::MAIN_SEPARATOR));
    }

    #[test]
    fn test_ensure_creates_root() {
        let temp = TempDir::new().unwrap();
        let root = StorageRoot::new(temp.path().join("nested").join(PROJECT_NAME));

        root.ensure().unwrap();
        assert!(root.path().is_dir());
        root.ensure().unwrap();
    }

    #[test]
    fn test_ensure_rejects_file_at_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("root");
        fs::write(&file, b"").unwrap();

        let result = StorageRoot::new(&file).ensure();
        assert!(matches!(result, Err(ProvisionError::RootUnavailable { .. })));
    }
}
