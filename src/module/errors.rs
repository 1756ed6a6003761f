//! # Module Registry Errors

use thiserror::Error;

/// Result type for registry operations
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Registry-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("Unrecognized module kind: {identity}: {reason}")]
    UnrecognizedModuleKind { identity: String, reason: String },

    #[error("Module registered twice: {0}")]
    DuplicateIdentity(String),
}

impl ModuleError {
    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            ModuleError::UnrecognizedModuleKind { .. } => "MODULE_UNRECOGNIZED_KIND",
            ModuleError::DuplicateIdentity(_) => "MODULE_DUPLICATE_IDENTITY",
        }
    }
}
