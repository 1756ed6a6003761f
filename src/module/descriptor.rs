//! Module descriptors and the storage-owning capability.

use super::path::{ModulePath, PathResolver};

/// Implemented by every type that owns a storage directory.
///
/// The identity is a stable, fully-qualified, dot-separated type name. It is
/// the only input to path derivation, so renaming it moves the module's data.
pub trait StorageModule {
    /// Fully-qualified identity, e.g. `toolboxes.workcenter.service.WorkCenterServiceImpl`
    const IDENTITY: &'static str;
}

/// Outcome of the capability check for a discovered identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleKind {
    /// Implements [`StorageModule`] and may own a directory
    Recognized,
    /// Marked for storage but not a storage-owning kind
    Unrecognized { reason: String },
}

/// A discovered module: identity, derived path, and capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    identity: String,
    path: ModulePath,
    kind: ModuleKind,
}

impl ModuleDescriptor {
    /// Describes a storage module type, resolving its path with the default resolver
    pub fn of<M: StorageModule>() -> Self {
        Self::recognized(M::IDENTITY, &PathResolver::default())
    }

    /// Describes a recognized identity
    pub fn recognized(identity: impl Into<String>, resolver: &PathResolver) -> Self {
        let identity = identity.into();
        Self {
            path: resolver.resolve(&identity),
            identity,
            kind: ModuleKind::Recognized,
        }
    }

    /// Describes an identity that failed the capability check
    pub fn unrecognized(identity: impl Into<String>, reason: impl Into<String>) -> Self {
        let identity = identity.into();
        Self {
            path: PathResolver::default().resolve(&identity),
            identity,
            kind: ModuleKind::Unrecognized {
                reason: reason.into(),
            },
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Declared relative storage path
    pub fn path(&self) -> &ModulePath {
        &self.path
    }

    pub fn kind(&self) -> &ModuleKind {
        &self.kind
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self.kind, ModuleKind::Recognized)
    }
}
