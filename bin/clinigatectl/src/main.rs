//! ---
//! cg_section: "05-external-interfaces"
//! cg_subsection: "binary"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Control CLI for administrators inspecting authorization state."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clinigate_common::{init_tracing, AppConfig};
use clinigate_logging::cg_debug;
use clinigate_security::{load_catalog, AuthorizationService, AuthzMetrics, Catalog, SharedCatalog};
use prometheus::{Registry, TextEncoder};

mod access;
mod catalog;

const CONFIG_CANDIDATES: &[&str] = &["clinigate.toml", "configs/clinigate.toml"];

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Clinigate authorization inspection utility",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to CLINIGATE_CONFIG, then ./clinigate.toml).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Catalog document overriding the configured catalog.
    #[arg(long, global = true, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Print Prometheus metrics to stderr after the command completes.
    #[arg(long, global = true)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(subcommand, about = "Catalog inspection and validation")]
    Catalog(catalog::CatalogCommand),
    #[command(about = "Evaluate one requirement for a subject")]
    Check(access::CheckCommand),
    #[command(about = "List a subject's effective permissions and hierarchy level")]
    Permissions(access::PermissionsCommand),
    #[command(name = "can-manage", about = "Decide whether one subject may manage another")]
    CanManage(access::CanManageCommand),
}

/// State shared by every subcommand.
pub struct Runtime {
    pub service: AuthorizationService,
    metrics: Option<AuthzMetrics>,
}

impl Runtime {
    fn build(config: &AppConfig) -> Result<Self> {
        let catalog = match &config.catalog.path {
            Some(path) => load_catalog(path)?,
            None => Catalog::clinical_default().context("built-in catalog is invalid")?,
        };
        cg_debug!(
            "catalog ready: {} roles, {} permissions",
            catalog.role_count(),
            catalog.permission_count()
        );

        let mut service = AuthorizationService::new(SharedCatalog::new(catalog));
        let metrics = if config.metrics.enabled {
            let metrics = AuthzMetrics::new(Arc::new(Registry::new()), &config.metrics.namespace)?;
            service = service.with_metrics(metrics.clone());
            Some(metrics)
        } else {
            None
        };
        Ok(Self { service, metrics })
    }

    /// The catalog currently installed in the service.
    pub fn catalog(&self) -> Arc<Catalog> {
        self.service.catalog().snapshot()
    }

    fn dump_metrics(&self) -> Result<()> {
        if let Some(metrics) = &self.metrics {
            let body = TextEncoder::new().encode_to_string(&metrics.registry().gather())?;
            eprint!("{body}");
        }
        Ok(())
    }
}

/// Load the configuration, letting `--catalog` fill in `catalog.path` before
/// validation so it can satisfy `allow_builtin = false`.
fn load_config(explicit: Option<&PathBuf>, catalog_override: Option<PathBuf>) -> Result<AppConfig> {
    let mut config = match explicit {
        Some(path) => AppConfig::read_path(path)?,
        None => AppConfig::read_or_default(CONFIG_CANDIDATES)?.config,
    };
    if let Some(path) = catalog_override {
        config.catalog.path = Some(path);
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_ref(), cli.catalog)?;
    init_tracing("clinigatectl", &config.logging)?;

    if let Commands::Catalog(catalog::CatalogCommand::Validate(cmd)) = &cli.command {
        return cmd.execute();
    }

    let runtime = Runtime::build(&config)?;
    let code = match cli.command {
        Commands::Catalog(cmd) => catalog::run(cmd, &runtime)?,
        Commands::Check(cmd) => cmd.execute(&runtime)?,
        Commands::Permissions(cmd) => cmd.execute(&runtime)?,
        Commands::CanManage(cmd) => cmd.execute(&runtime)?,
    };
    if cli.print_metrics {
        runtime.dump_metrics()?;
    }
    Ok(code)
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn runtime_defaults_to_builtin_catalog() {
        let runtime = Runtime::build(&AppConfig::default()).unwrap();
        assert!(runtime.catalog().role("SUPER_ADMIN").is_some());
        assert!(runtime.metrics.is_some());
    }

    #[test]
    fn runtime_honours_catalog_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"permissions": [{"id": "view_protocols", "resource": "protocols", "action": "read"}],
                "roles": [{"id": "viewer", "hierarchy": 1, "permissions": ["view_protocols"]}]}"#,
        )
        .unwrap();
        let config = load_config(None, Some(path)).unwrap();
        let runtime = Runtime::build(&config).unwrap();
        assert_eq!(runtime.catalog().role_count(), 1);
    }

    #[test]
    fn catalog_override_satisfies_strict_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("clinigate.toml");
        std::fs::write(&config_path, "[catalog]\nallow_builtin = false\n").unwrap();
        let catalog_path = dir.path().join("catalog.toml");

        assert!(load_config(Some(&config_path), None).is_err());
        let config = load_config(Some(&config_path), Some(catalog_path.clone())).unwrap();
        assert_eq!(config.catalog.path, Some(catalog_path));
        assert!(!config.catalog.allow_builtin);
    }
}
