//! Identity-to-path derivation.
//!
//! A module identity such as `toolboxes.workcenter.service.WorkCenterServiceImpl`
//! maps to the relative storage path `/toolboxes/workcenter/service/workcenter/`:
//!
//! 1. every occurrence of the implementation suffix is removed
//! 2. namespace separators become the platform directory separator
//! 3. the result is lower-cased
//! 4. a separator is added at both ends
//!
//! Lower-casing means identities differing only by case, or only by the
//! suffix, resolve to the same directory. Such collisions are reported by
//! [`ModuleRegistry::collisions`](super::ModuleRegistry::collisions), not
//! prevented here. Characters that are illegal on the target filesystem are
//! not escaped.

use std::fmt;
use std::path::{Path, MAIN_SEPARATOR};

/// Suffix stripped from identities of implementation types
pub const IMPLEMENTATION_SUFFIX: &str = "ServiceImpl";

/// Separator between namespace segments of an identity
pub const NAMESPACE_SEPARATOR: char = '.';

/// Relative storage path of a module, with a leading and trailing separator.
///
/// Computed once per module and passed around by value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModulePath(String);

impl ModulePath {
    /// The path as a string, e.g. `/toolboxes/workcenter/service/workcenter/`
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path without its surrounding separators, safe to join onto a root.
    ///
    /// The trailing separator is dropped too: on POSIX `metadata("file/")`
    /// fails with ENOTDIR instead of describing the file.
    pub fn as_relative(&self) -> &Path {
        Path::new(self.0.trim_matches(MAIN_SEPARATOR))
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives module storage paths from identities.
#[derive(Debug, Clone)]
pub struct PathResolver {
    suffix: String,
    separator: char,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(IMPLEMENTATION_SUFFIX, NAMESPACE_SEPARATOR)
    }
}

impl PathResolver {
    /// Creates a resolver with a custom suffix token and namespace separator
    pub fn new(suffix: impl Into<String>, separator: char) -> Self {
        Self {
            suffix: suffix.into(),
            separator,
        }
    }

    /// Resolves `identity` to its relative storage path.
    ///
    /// Pure: the same identity always yields the same path.
    pub fn resolve(&self, identity: &str) -> ModulePath {
        let stripped = if self.suffix.is_empty() {
            identity.to_string()
        } else {
            identity.replace(self.suffix.as_str(), "")
        };
        let body = stripped
            .replace(self.separator, &MAIN_SEPARATOR.to_string())
            .to_lowercase();
        ModulePath(format!("{MAIN_SEPARATOR}{body}{MAIN_SEPARATOR}"))
    }
}

/// Resolves `identity` with the default suffix and separator.
pub fn resolve(identity: &str) -> ModulePath {
    PathResolver::default().resolve(identity)
}
