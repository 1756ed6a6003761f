//! # Directory Provisioning
//!
//! Ensures the storage root and every registered module's directory exist
//! before the process starts serving. Idempotent: existing directories are
//! skipped, so a second pass creates nothing.
//!
//! Any failure is fatal to startup. All failures are collected first so the
//! operator sees the complete list.

mod errors;
mod provisioner;
mod root;

pub use errors::{FailureReason, ModuleFailure, ProvisionError, ProvisionResult};
pub use provisioner::{DirectoryProvisioner, ExistingPathPolicy, ProvisionReport};
pub use root::{StorageRoot, PROJECT_NAME};
