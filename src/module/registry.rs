//! Module registry and the discovery seam that populates it.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::descriptor::{ModuleDescriptor, ModuleKind, StorageModule};
use super::errors::{ModuleError, ModuleResult};
use super::path::{ModulePath, NAMESPACE_SEPARATOR};

/// Source of module descriptors.
///
/// Given a scan root namespace, returns every candidate module under it,
/// including the ones that fail the capability check.
pub trait ModuleDiscovery {
    fn discover(&self, scan_root: &str) -> Vec<ModuleDescriptor>;
}

/// Discovery backed by an explicit, compile-time list of modules.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    entries: Vec<ModuleDescriptor>,
}

impl StaticDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a storage module type
    pub fn module<M: StorageModule>(mut self) -> Self {
        self.entries.push(ModuleDescriptor::of::<M>());
        self
    }

    /// Adds a prebuilt descriptor
    pub fn descriptor(mut self, descriptor: ModuleDescriptor) -> Self {
        self.entries.push(descriptor);
        self
    }
}

impl ModuleDiscovery for StaticDiscovery {
    fn discover(&self, scan_root: &str) -> Vec<ModuleDescriptor> {
        self.entries
            .iter()
            .filter(|d| in_namespace(d.identity(), scan_root))
            .cloned()
            .collect()
    }
}

fn in_namespace(identity: &str, root: &str) -> bool {
    if root.is_empty() {
        return true;
    }
    identity == root
        || identity
            .strip_prefix(root)
            .map_or(false, |rest| rest.starts_with(NAMESPACE_SEPARATOR))
}

/// Identities that resolve to the same storage directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCollision {
    pub path: ModulePath,
    pub identities: Vec<String>,
}

/// The set of modules to provision, keyed by identity.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, ModuleDescriptor>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from everything `discovery` finds under `scan_root`.
    pub fn discover(discovery: &dyn ModuleDiscovery, scan_root: &str) -> ModuleResult<Self> {
        let mut registry = Self::new();
        for descriptor in discovery.discover(scan_root) {
            registry.register(descriptor)?;
        }
        debug!(scan_root, modules = registry.len(), "module discovery complete");
        for error in registry.errors() {
            warn!(code = error.code(), "{}", error);
        }
        Ok(registry)
    }

    /// Adds a descriptor; each identity may be registered once.
    pub fn register(&mut self, descriptor: ModuleDescriptor) -> ModuleResult<()> {
        if self.modules.contains_key(descriptor.identity()) {
            return Err(ModuleError::DuplicateIdentity(
                descriptor.identity().to_string(),
            ));
        }
        self.modules
            .insert(descriptor.identity().to_string(), descriptor);
        Ok(())
    }

    pub fn get(&self, identity: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(identity)
    }

    /// All descriptors in identity order
    pub fn descriptors(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Capability-check failures, one error per offending identity
    pub fn errors(&self) -> Vec<ModuleError> {
        self.modules
            .values()
            .filter_map(|d| match d.kind() {
                ModuleKind::Recognized => None,
                ModuleKind::Unrecognized { reason } => Some(ModuleError::UnrecognizedModuleKind {
                    identity: d.identity().to_string(),
                    reason: reason.clone(),
                }),
            })
            .collect()
    }

    /// Groups of recognized modules sharing one storage directory.
    ///
    /// Path derivation lower-cases and strips the implementation suffix, so
    /// distinct identities can collide. They then share a directory.
    pub fn collisions(&self) -> Vec<PathCollision> {
        let mut by_path: BTreeMap<&ModulePath, Vec<String>> = BTreeMap::new();
        for descriptor in self.modules.values().filter(|d| d.is_recognized()) {
            by_path
                .entry(descriptor.path())
                .or_default()
                .push(descriptor.identity().to_string());
        }
        by_path
            .into_iter()
            .filter(|(_, identities)| identities.len() > 1)
            .map(|(path, identities)| PathCollision {
                path: path.clone(),
                identities,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::PathResolver;

    struct Notes;
    impl StorageModule for Notes {
        const IDENTITY: &'static str = "toolboxes.notes.NotesServiceImpl";
    }

    struct Outsider;
    impl StorageModule for Outsider {
        const IDENTITY: &'static str = "thirdparty.cache.CacheServiceImpl";
    }

    #[test]
    fn test_discovery_respects_scan_root() {
        let discovery = StaticDiscovery::new().module::<Notes>().module::<Outsider>();
        let registry = ModuleRegistry::discover(&discovery, "toolboxes").unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.get(Notes::IDENTITY).is_some());
        assert!(registry.get(Outsider::IDENTITY).is_none());
    }

    #[test]
    fn test_scan_root_matches_whole_segments() {
        assert!(in_namespace("toolboxes.notes.X", "toolboxes"));
        assert!(in_namespace("toolboxes", "toolboxes"));
        assert!(!in_namespace("toolboxesextra.X", "toolboxes"));
        assert!(in_namespace("anything.X", ""));
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let discovery = StaticDiscovery::new().module::<Notes>().module::<Notes>();
        let result = ModuleRegistry::discover(&discovery, "toolboxes");
        assert_eq!(
            result.unwrap_err(),
            ModuleError::DuplicateIdentity(Notes::IDENTITY.to_string())
        );
    }

    #[test]
    fn test_unrecognized_reported_not_dropped() {
        let discovery = StaticDiscovery::new()
            .module::<Notes>()
            .descriptor(ModuleDescriptor::unrecognized(
                "toolboxes.stray.Helper",
                "does not implement StorageModule",
            ));
        let registry = ModuleRegistry::discover(&discovery, "toolboxes").unwrap();

        assert_eq!(registry.len(), 2);
        let errors = registry.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), "MODULE_UNRECOGNIZED_KIND");
    }

    #[test]
    fn test_case_collisions_reported() {
        let resolver = PathResolver::default();
        let mut registry = ModuleRegistry::new();
        registry
            .register(ModuleDescriptor::recognized("toolboxes.Notes", &resolver))
            .unwrap();
        registry
            .register(ModuleDescriptor::recognized("toolboxes.NOTES", &resolver))
            .unwrap();
        registry
            .register(ModuleDescriptor::recognized("toolboxes.NotesServiceImpl", &resolver))
            .unwrap();
        registry
            .register(ModuleDescriptor::recognized("toolboxes.Tasks", &resolver))
            .unwrap();

        let collisions = registry.collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].identities.len(), 3);
        assert_eq!(collisions[0].path, resolver.resolve("toolboxes.notes"));
    }
}
