//! # Storage Modules
//!
//! A module is a logical owner of one storage directory, identified by a
//! stable type identity. This module covers:
//!
//! - deriving a module's relative storage path from its identity
//! - describing discovered modules and whether they are storage-owning
//! - collecting them into the registry the provisioner consumes
//!
//! Discovery is an explicit compile-time list rather than runtime scanning.

mod descriptor;
mod errors;
mod path;
mod registry;

pub use descriptor::{ModuleDescriptor, ModuleKind, StorageModule};
pub use errors::{ModuleError, ModuleResult};
pub use path::{resolve, ModulePath, PathResolver, IMPLEMENTATION_SUFFIX, NAMESPACE_SEPARATOR};
pub use registry::{ModuleDiscovery, ModuleRegistry, PathCollision, StaticDiscovery};
