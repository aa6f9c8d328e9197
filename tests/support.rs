//! ---
//! cg_section: "15-testing-qa"
//! cg_subsection: "integration-tests"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Shared fixtures for the integration suites."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clinigate_security::{render_catalog, Catalog, CatalogFormat, Permission, Role};
use tempfile::TempDir;

/// A small non-clinical catalog with two ranks sharing a level.
pub fn ward_catalog() -> Catalog {
    let permission = |id: &str, resource: &str, action: &str| {
        Permission::new(id, id, "", resource, action)
    };
    Catalog::new(
        [
            permission("view_patient_data", "patients", "read"),
            permission("edit_patient_data", "patients", "write"),
            permission("manage_users", "users", "write"),
        ],
        [
            Role::new("WARD_MANAGER", "Ward Manager", 50, ["view_patient_data", "manage_users"]),
            Role::new("CHARGE_NURSE", "Charge Nurse", 50, ["view_patient_data", "edit_patient_data", "manage_users"]),
            Role::new("HEALTHCARE_ASSISTANT", "Healthcare Assistant", 20, ["view_patient_data"]),
        ],
    )
    .expect("ward catalog is valid")
}

/// Write `catalog` to `dir/name`, choosing the format from the extension.
pub fn write_catalog(dir: &Path, name: &str, catalog: &Catalog) -> Result<PathBuf> {
    let path = dir.join(name);
    let format = CatalogFormat::from_path(&path)?;
    fs::write(&path, render_catalog(catalog, format)?)?;
    Ok(path)
}

/// Fresh temporary directory.
pub fn scratch() -> TempDir {
    tempfile::tempdir().expect("temporary directory")
}

/// Decode a subject the way an identity collaborator would hand it over.
pub fn subject_from_json(value: serde_json::Value) -> clinigate_security::Subject {
    serde_json::from_value(value).expect("subject decoding never fails for JSON objects")
}
