//! CLI module for toolboxes
//!
//! Provides command-line interface for:
//! - provision: Create module storage directories
//! - serve: Provision, then serve the REST API
//! - modules: List registered modules
//! - size: Report a module's on-disk size

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    application_modules, boot, modules_report, provision_report, run, run_command, serve,
    size_report, Boot, SCAN_ROOT,
};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
