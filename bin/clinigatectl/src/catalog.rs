//! ---
//! cg_section: "05-external-interfaces"
//! cg_subsection: "binary"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Catalog inspection subcommands."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand, ValueEnum};
use clinigate_logging::{cg_warn, LogContext};
use clinigate_security::{load_catalog, render_catalog, Catalog, CatalogFormat};
use indexmap::IndexMap;
use serde::Serialize;

use crate::Runtime;

/// Dispatch entry point for catalog subcommands.
pub fn run(command: CatalogCommand, runtime: &Runtime) -> Result<ExitCode> {
    match command {
        CatalogCommand::Show(cmd) => cmd.execute(runtime),
        CatalogCommand::Validate(cmd) => cmd.execute(),
        CatalogCommand::Matrix(cmd) => cmd.execute(runtime),
        CatalogCommand::Roles => list_roles(runtime),
    }
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// Print the active catalog.
    Show(ShowCommand),
    /// Load and validate a catalog document without installing it.
    Validate(ValidateCommand),
    /// Print the permission matrix of a role.
    Matrix(MatrixCommand),
    /// List roles from most to least privileged.
    Roles,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Toml,
    Json,
    Yaml,
}

impl From<FormatArg> for CatalogFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Toml => CatalogFormat::Toml,
            FormatArg::Json => CatalogFormat::Json,
            FormatArg::Yaml => CatalogFormat::Yaml,
        }
    }
}

#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatArg::Json)]
    format: FormatArg,
}

impl ShowCommand {
    fn execute(self, runtime: &Runtime) -> Result<ExitCode> {
        let rendered = render_catalog(&runtime.catalog(), self.format.into())?;
        println!("{rendered}");
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Catalog document (`.toml`, `.json`, `.yaml`).
    #[arg(value_name = "FILE")]
    path: PathBuf,
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    path: String,
    valid: bool,
    permissions: usize,
    roles: usize,
}

impl ValidateCommand {
    pub fn execute(&self) -> Result<ExitCode> {
        let report = self.validate()?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(ExitCode::SUCCESS)
    }

    fn validate(&self) -> Result<ValidationReport> {
        let path = self.path.display().to_string();
        let catalog = load_catalog(&self.path).inspect_err(|err| {
            cg_warn!(
                context = LogContext::new().with_target(&path),
                "catalog rejected: {:#}",
                err
            );
        })?;
        Ok(ValidationReport {
            path,
            valid: true,
            permissions: catalog.permission_count(),
            roles: catalog.role_count(),
        })
    }
}

#[derive(Debug, Args)]
pub struct MatrixCommand {
    /// Role identifier (case-insensitive). Unknown roles print an all-false matrix.
    #[arg(value_name = "ROLE")]
    role: String,
}

#[derive(Debug, Serialize)]
struct MatrixReport {
    role: String,
    known: bool,
    granted_reads: usize,
    granted_writes: usize,
    matrix: IndexMap<String, bool>,
}

impl MatrixReport {
    fn build(catalog: &Catalog, role: &str) -> Self {
        let matrix = catalog.permission_matrix(role);
        let (granted_reads, granted_writes) = catalog
            .permissions()
            .filter(|permission| matrix.get(&permission.id).copied().unwrap_or(false))
            .fold((0, 0), |(reads, writes), permission| {
                if permission.is_read() {
                    (reads + 1, writes)
                } else {
                    (reads, writes + 1)
                }
            });
        Self {
            role: role.to_owned(),
            known: catalog.role(role).is_some(),
            granted_reads,
            granted_writes,
            matrix,
        }
    }
}

impl MatrixCommand {
    fn execute(self, runtime: &Runtime) -> Result<ExitCode> {
        let report = MatrixReport::build(&runtime.catalog(), &self.role);
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Debug, Serialize)]
struct RoleSummary {
    id: String,
    name: String,
    hierarchy: u32,
    system: bool,
    permissions: usize,
}

#[derive(Debug, Serialize)]
struct RoleListing {
    revision: u64,
    installed_at: DateTime<Utc>,
    roles: Vec<RoleSummary>,
}

fn list_roles(runtime: &Runtime) -> Result<ExitCode> {
    let shared = runtime.service.catalog();
    let (catalog, revision) = shared.versioned();
    let listing = RoleListing {
        revision,
        installed_at: shared.installed_at(),
        roles: catalog
            .roles_by_hierarchy()
            .into_iter()
            .map(|role| RoleSummary {
                id: role.id.clone(),
                name: role.name.clone(),
                hierarchy: role.hierarchy,
                system: role.is_system_role,
                permissions: role.permissions.len(),
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_splits_reads_and_writes() {
        let catalog = Catalog::clinical_default().unwrap();
        let pharmacist = MatrixReport::build(&catalog, "pharmacist");
        assert!(pharmacist.known);
        let granted = pharmacist.matrix.values().filter(|granted| **granted).count();
        assert_eq!(pharmacist.granted_reads + pharmacist.granted_writes, granted);
        // view_patient_data, view_medications, view_protocols vs edit and dispense
        assert_eq!((pharmacist.granted_reads, pharmacist.granted_writes), (3, 2));

        let viewer = MatrixReport::build(&catalog, "VIEWER");
        assert_eq!(viewer.granted_writes, 0);

        let unknown = MatrixReport::build(&catalog, "janitor");
        assert!(!unknown.known);
        assert_eq!((unknown.granted_reads, unknown.granted_writes), (0, 0));
        assert_eq!(unknown.matrix.len(), catalog.permission_count());
    }

    #[test]
    fn validate_rejects_invalid_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(
            &path,
            "permissions: []\nroles:\n  - id: nurse\n    permissions: [ghost]\n",
        )
        .unwrap();
        let command = ValidateCommand { path };
        let err = command.validate().unwrap_err();
        assert!(format!("{err:#}").contains("broken.yaml"));
    }

    #[test]
    fn validate_summarises_valid_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.json");
        std::fs::write(
            &path,
            r#"{"permissions": [{"id": "view_protocols", "resource": "protocols", "action": "read"}],
                "roles": [{"id": "viewer", "hierarchy": 1, "permissions": ["view_protocols"]}]}"#,
        )
        .unwrap();
        let report = ValidateCommand { path }.validate().unwrap();
        assert!(report.valid);
        assert_eq!((report.permissions, report.roles), (1, 1));
    }
}
