//! Startup directory provisioning.
//!
//! Runs once per process, sequentially, before anything is served. Each
//! registered module is handled independently:
//!
//! 1. unrecognized kind → failure recorded, continue
//! 2. directory already present → skipped
//! 3. non-directory present → failure, or skipped under `AcceptAny`
//! 4. absent → created with all ancestors; failure recorded, continue
//!
//! A path that cannot be inspected at all is a failure, never "absent".
//!
//! The pass succeeds only if nothing failed. Callers treat failure as fatal.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::file_store;
use crate::module::{ModuleKind, ModuleRegistry};

use super::errors::{FailureReason, ModuleFailure, ProvisionError, ProvisionResult};
use super::root::StorageRoot;

/// What to do when a module's path already exists but is not a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingPathPolicy {
    /// Anything but a directory is a provisioning failure
    #[default]
    RequireDirectory,
    /// Any existing entry counts as provisioned
    AcceptAny,
}

/// Outcome of a successful provisioning pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    /// (identity, directory) pairs created by this pass
    pub created: Vec<(String, PathBuf)>,
    /// (identity, directory) pairs that already existed
    pub skipped: Vec<(String, PathBuf)>,
}

impl ProvisionReport {
    /// Number of directories this pass created
    pub fn newly_created(&self) -> usize {
        self.created.len()
    }
}

/// Ensures every registered module has its directory under the storage root.
#[derive(Debug, Clone, Default)]
pub struct DirectoryProvisioner {
    policy: ExistingPathPolicy,
}

impl DirectoryProvisioner {
    pub fn new(policy: ExistingPathPolicy) -> Self {
        Self { policy }
    }

    /// Provisions every module in `registry` under `root`.
    ///
    /// # Errors
    ///
    /// - `RootUnavailable` if the root cannot be created or written
    /// - `ModulesFailed` with every per-module failure, after all modules
    ///   have been attempted
    pub fn provision(
        &self,
        root: &StorageRoot,
        registry: &ModuleRegistry,
    ) -> ProvisionResult<ProvisionReport> {
        info!(
            root = %root.path().display(),
            modules = registry.len(),
            policy = ?self.policy,
            "provisioning module directories"
        );
        root.ensure()?;

        for collision in registry.collisions() {
            warn!(
                path = %collision.path,
                identities = ?collision.identities,
                "modules share a storage directory"
            );
        }

        let mut report = ProvisionReport::default();
        let mut failures = Vec::new();

        for descriptor in registry.descriptors() {
            let identity = descriptor.identity().to_string();

            if let ModuleKind::Unrecognized { reason } = descriptor.kind() {
                failures.push(ModuleFailure {
                    identity,
                    reason: FailureReason::UnrecognizedModuleKind(reason.clone()),
                });
                continue;
            }

            let target = root.module_dir(descriptor.path());
            match fs::metadata(&target) {
                Ok(meta) if meta.is_dir() || self.policy == ExistingPathPolicy::AcceptAny => {
                    report.skipped.push((identity, target));
                }
                Ok(_) => failures.push(ModuleFailure {
                    identity,
                    reason: FailureReason::OccupiedByNonDirectory(target),
                }),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    match file_store::create_dir_all(&target) {
                        Ok(()) => report.created.push((identity, target)),
                        Err(e) => failures.push(ModuleFailure {
                            identity,
                            reason: FailureReason::CreateFailed(e),
                        }),
                    }
                }
                Err(e) => failures.push(ModuleFailure {
                    identity,
                    reason: FailureReason::Uninspectable {
                        path: target,
                        source: e,
                    },
                }),
            }
        }

        if !failures.is_empty() {
            for failure in &failures {
                error!(identity = %failure.identity, reason = %failure.reason, "module provisioning failed");
            }
            return Err(ProvisionError::ModulesFailed(failures));
        }

        info!(
            created = report.created.len(),
            skipped = report.skipped.len(),
            "provisioning complete"
        );
        Ok(report)
    }
}
