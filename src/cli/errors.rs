//! Errors surfaced by the `toolboxes` binary.
//!
//! Every one is fatal: `main` prints it and exits with status 1. The code
//! prefix tells a bad config file apart from a failed startup pass. Lower
//! layers convert with `?`; their own codes stay in the message.

use std::fmt;
use std::io;

use crate::document::DocumentError;
use crate::file_store::FileStoreError;
use crate::http_server::HttpConfigError;
use crate::module::ModuleError;
use crate::observability::LoggingError;
use crate::provision::ProvisionError;

/// What kind of failure stopped the command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Config file unreadable or rejected, including logging settings
    ConfigError,
    /// Output or storage access failed after startup
    IoError,
    /// Discovery, provisioning, or the server could not start
    BootFailed,
    /// `--module` names no registered module
    UnknownModule,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "TOOLBOXES_CLI_CONFIG_ERROR",
            Self::IoError => "TOOLBOXES_CLI_IO_ERROR",
            Self::BootFailed => "TOOLBOXES_CLI_BOOT_FAILED",
            Self::UnknownModule => "TOOLBOXES_CLI_UNKNOWN_MODULE",
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    pub fn unknown_module(identity: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownModule,
            format!("No registered module '{}'. Run 'toolboxes modules' to list them.", identity),
        )
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<ProvisionError> for CliError {
    fn from(e: ProvisionError) -> Self {
        Self::boot_failed(format!("[{}] {}", e.code(), e))
    }
}

impl From<ModuleError> for CliError {
    fn from(e: ModuleError) -> Self {
        Self::boot_failed(format!("[{}] {}", e.code(), e))
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<HttpConfigError> for CliError {
    fn from(e: HttpConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<FileStoreError> for CliError {
    fn from(e: FileStoreError) -> Self {
        Self::new(CliErrorCode::IoError, format!("[{}] {}", e.code(), e))
    }
}

impl From<DocumentError> for CliError {
    fn from(e: DocumentError) -> Self {
        Self::new(CliErrorCode::IoError, e.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::new(CliErrorCode::IoError, e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(CliErrorCode::IoError, format!("JSON error: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
