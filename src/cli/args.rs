//! CLI argument definitions using clap
//!
//! Global options: `--config <file>`, `--log-format compact|json`.
//!
//! Commands:
//! - toolboxes provision
//! - toolboxes serve [--port <port>]
//! - toolboxes modules
//! - toolboxes size --module <identity>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::observability::LogFormat;

/// Toolboxes - personal tools backed by per-module file storage
#[derive(Parser, Debug)]
#[command(name = "toolboxes")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to JSON configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the configured log format (compact or json)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create every module's storage directory and exit
    Provision,

    /// Provision, then serve the REST API
    Serve {
        /// Overrides the configured HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// List registered modules and their storage directories
    Modules,

    /// Report the on-disk size of one module's directory
    Size {
        /// Module identity, e.g. toolboxes.workcenter.service.WorkCenterServiceImpl
        #[arg(long)]
        module: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
