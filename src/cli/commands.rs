//! CLI command implementations
//!
//! Every command runs the same startup sequence before its body:
//!
//! 1. load config
//! 2. init logging
//! 3. resolve the storage root
//! 4. build the module registry
//! 5. provision module directories
//!
//! Any provisioning failure aborts startup; the command body never runs.

use serde_json::{json, Value};
use tracing::info;

use crate::document::{DateBucket, ModuleStorage};
use crate::file_store;
use crate::http_server::HttpServer;
use crate::module::{ModuleDiscovery, ModuleRegistry, StaticDiscovery};
use crate::observability::init_logging;
use crate::provision::{DirectoryProvisioner, ProvisionReport, StorageRoot, PROJECT_NAME};
use crate::workcenter::WorkCenterService;

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Namespace module discovery is restricted to
pub const SCAN_ROOT: &str = PROJECT_NAME;

/// Storage modules compiled into this binary
pub fn application_modules() -> StaticDiscovery {
    StaticDiscovery::new().module::<WorkCenterService>()
}

/// Everything a command body needs after a successful startup
#[derive(Debug)]
pub struct Boot {
    pub config: Config,
    pub root: StorageRoot,
    pub registry: ModuleRegistry,
    pub report: ProvisionReport,
}

/// Runs the startup sequence with an already loaded config.
pub fn boot(config: Config, discovery: &dyn ModuleDiscovery) -> CliResult<Boot> {
    init_logging(&config.log_level, config.log_format)?;

    let root = config.storage_root()?;
    let registry = ModuleRegistry::discover(discovery, SCAN_ROOT)?;
    let report = DirectoryProvisioner::new(config.existing_path_policy).provision(&root, &registry)?;

    info!(root = %root.path().display(), "startup complete");
    Ok(Boot {
        config,
        root,
        registry,
        report,
    })
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}

/// Loads the config, applies command-line overrides, boots, then runs the
/// command
pub fn run_command(cli: Cli) -> CliResult<()> {
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    let boot = boot(config, &application_modules())?;

    match cli.command {
        Command::Provision => write_response(provision_report(&boot)),
        Command::Serve { port } => serve(boot, port),
        Command::Modules => write_response(modules_report(&boot)),
        Command::Size { module } => write_response(size_report(&boot, &module)?),
    }
}

/// Directories created and skipped by the startup pass
pub fn provision_report(boot: &Boot) -> Value {
    let entries = |list: &[(String, std::path::PathBuf)]| -> Vec<Value> {
        list.iter()
            .map(|(identity, path)| json!({"identity": identity, "path": path.display().to_string()}))
            .collect()
    };

    json!({
        "root": boot.root.path().display().to_string(),
        "created": entries(&boot.report.created),
        "skipped": entries(&boot.report.skipped),
    })
}

/// Registered modules, their directories, and known path collisions
pub fn modules_report(boot: &Boot) -> Value {
    let modules: Vec<Value> = boot
        .registry
        .descriptors()
        .map(|d| {
            json!({
                "identity": d.identity(),
                "path": d.path().as_str(),
                "directory": boot.root.module_dir(d.path()).display().to_string(),
                "recognized": d.is_recognized(),
            })
        })
        .collect();

    let collisions: Vec<Value> = boot
        .registry
        .collisions()
        .into_iter()
        .map(|c| json!({"path": c.path.as_str(), "identities": c.identities}))
        .collect();

    json!({
        "root": boot.root.path().display().to_string(),
        "modules": modules,
        "collisions": collisions,
    })
}

/// Best-effort size of one module's directory, and its day buckets
pub fn size_report(boot: &Boot, identity: &str) -> CliResult<Value> {
    let descriptor = boot
        .registry
        .get(identity)
        .ok_or_else(|| CliError::unknown_module(identity))?;
    let storage = ModuleStorage::for_descriptor(&boot.root, descriptor);
    let bytes = file_store::size_of(storage.dir())?;
    let buckets: Vec<String> = storage.buckets()?.iter().map(DateBucket::name).collect();

    Ok(json!({
        "identity": identity,
        "directory": storage.dir().display().to_string(),
        "bytes": bytes,
        "human": file_store::format_byte_size(bytes),
        "buckets": buckets,
    }))
}

/// Serves the REST API until the process is stopped
pub fn serve(boot: Boot, port: Option<u16>) -> CliResult<()> {
    let mut http = boot.config.http.clone();
    if let Some(port) = port {
        http.port = port;
    }

    let server = HttpServer::new(http, WorkCenterService::new(&boot.root));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use crate::module::{ModuleDescriptor, StorageModule};
    use std::fs;
    use tempfile::TempDir;

    fn config_for(temp: &TempDir) -> Config {
        Config {
            data_dir: Some(temp.path().join("data").to_string_lossy().into_owned()),
            ..Config::default()
        }
    }

    #[test]
    fn test_provision_command_creates_module_dirs() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("toolboxes.json");
        let body = json!({ "data_dir": temp.path().join("data").to_string_lossy() });
        fs::write(&config_path, body.to_string()).unwrap();

        let cli = Cli {
            config: Some(config_path),
            log_format: None,
            command: Command::Provision,
        };
        run_command(cli).unwrap();

        assert!(temp
            .path()
            .join("data/toolboxes/workcenter/service/workcenter")
            .is_dir());
    }

    #[test]
    fn test_second_boot_creates_nothing() {
        let temp = TempDir::new().unwrap();

        let first = boot(config_for(&temp), &application_modules()).unwrap();
        assert_eq!(first.report.newly_created(), 1);

        let second = boot(config_for(&temp), &application_modules()).unwrap();
        assert_eq!(second.report.newly_created(), 0);
        assert_eq!(provision_report(&second)["skipped"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_boot_fails_on_unrecognized_module() {
        let temp = TempDir::new().unwrap();
        let discovery = application_modules().descriptor(ModuleDescriptor::unrecognized(
            "toolboxes.notes.NotesController",
            "not a storage module",
        ));

        let err = boot(config_for(&temp), &discovery).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::BootFailed);
        assert!(err.message().contains("toolboxes.notes.NotesController"));
    }

    #[test]
    fn test_modules_report() {
        let temp = TempDir::new().unwrap();
        let boot = boot(config_for(&temp), &application_modules()).unwrap();

        let report = modules_report(&boot);
        let modules = report["modules"].as_array().unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0]["path"], "/toolboxes/workcenter/service/workcenter/");
        assert!(report["collisions"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_size_report() {
        let temp = TempDir::new().unwrap();
        let boot = boot(config_for(&temp), &application_modules()).unwrap();
        let dir = boot
            .root
            .path()
            .join("toolboxes/workcenter/service/workcenter/20240301");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.json"), vec![b'x'; 2048]).unwrap();

        let report = size_report(&boot, WorkCenterService::IDENTITY).unwrap();
        assert_eq!(report["bytes"], 2048);
        assert_eq!(report["human"], "2 KB");
        assert_eq!(report["buckets"], json!(["20240301"]));

        let err = size_report(&boot, "toolboxes.nope.NopeServiceImpl").unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::UnknownModule);
    }
}
