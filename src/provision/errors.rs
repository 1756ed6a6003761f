//! Provisioning errors.
//!
//! Provisioning never stops at the first failure. Every module is attempted
//! and every failure is returned, so all of them can be fixed in one pass.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::file_store::FileStoreError;

/// Result type for provisioning
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Why a single module could not be provisioned
#[derive(Debug, Error)]
pub enum FailureReason {
    #[error("unrecognized module kind: {0}")]
    UnrecognizedModuleKind(String),

    #[error("path exists but is not a directory: {}", .0.display())]
    OccupiedByNonDirectory(PathBuf),

    #[error("path could not be inspected: {}: {source}", .path.display())]
    Uninspectable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("directory could not be created: {0}")]
    CreateFailed(#[source] FileStoreError),
}

/// A provisioning failure tied to a module identity
#[derive(Debug)]
pub struct ModuleFailure {
    pub identity: String,
    pub reason: FailureReason,
}

impl fmt::Display for ModuleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.identity, self.reason)
    }
}

impl std::error::Error for ModuleFailure {}

/// Provisioning errors
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// No home directory to derive the storage root from
    #[error("Cannot determine the user home directory for the storage root")]
    NoHomeDirectory,

    /// The storage root itself is missing or unusable
    #[error("Storage root unavailable at {}: {source}", .path.display())]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: FileStoreError,
    },

    /// One or more modules failed; holds every failure
    #[error("{} module(s) failed to provision:\n{}", .0.len(), list_failures(.0))]
    ModulesFailed(Vec<ModuleFailure>),
}

fn list_failures(failures: &[ModuleFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("  - {}", f))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ProvisionError {
    /// Per-module failures (empty for root-level errors)
    pub fn failures(&self) -> &[ModuleFailure] {
        match self {
            ProvisionError::ModulesFailed(failures) => failures,
            _ => &[],
        }
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            ProvisionError::NoHomeDirectory => "PROVISION_NO_HOME",
            ProvisionError::RootUnavailable { .. } => "PROVISION_ROOT_UNAVAILABLE",
            ProvisionError::ModulesFailed(_) => "PROVISION_MODULES_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_every_failure() {
        let err = ProvisionError::ModulesFailed(vec![
            ModuleFailure {
                identity: "toolboxes.a.AServiceImpl".into(),
                reason: FailureReason::UnrecognizedModuleKind("not storage-owning".into()),
            },
            ModuleFailure {
                identity: "toolboxes.b.BServiceImpl".into(),
                reason: FailureReason::OccupiedByNonDirectory(PathBuf::from("/r/toolboxes/b/b")),
            },
        ]);

        let msg = err.to_string();
        assert!(msg.starts_with("2 module(s) failed"));
        assert!(msg.contains("toolboxes.a.AServiceImpl: unrecognized module kind"));
        assert!(msg.contains("toolboxes.b.BServiceImpl: path exists but is not a directory"));
        assert_eq!(err.failures().len(), 2);
    }
}
