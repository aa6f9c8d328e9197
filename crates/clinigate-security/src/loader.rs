//! ---
//! cg_section: "02-authorization-core"
//! cg_subsection: "module"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Catalog documents loaded from disk."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use crate::catalog::{Catalog, CatalogDocument};

/// Serialization formats accepted for catalog documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    /// `.toml`
    Toml,
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl CatalogFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => Ok(CatalogFormat::Toml),
            Some("json") => Ok(CatalogFormat::Json),
            Some("yaml" | "yml") => Ok(CatalogFormat::Yaml),
            _ => Err(anyhow!(
                "unsupported catalog format for {} (expected .toml, .json, .yaml or .yml)",
                path.display()
            )),
        }
    }
}

/// Parse and validate a catalog from an in-memory document.
pub fn parse_catalog(contents: &str, format: CatalogFormat) -> Result<Catalog> {
    let document: CatalogDocument = match format {
        CatalogFormat::Toml => toml::from_str(contents).context("failed to parse TOML catalog")?,
        CatalogFormat::Json => {
            serde_json::from_str(contents).context("failed to parse JSON catalog")?
        }
        CatalogFormat::Yaml => {
            serde_yaml::from_str(contents).context("failed to parse YAML catalog")?
        }
    };
    Ok(Catalog::from_document(document)?)
}

/// Load and validate a catalog file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let format = CatalogFormat::from_path(path)?;
    debug!(catalog_path = %path.display(), ?format, "loading catalog");
    let contents = fs::read_to_string(path)
        .with_context(|| format!("unable to read catalog file {}", path.display()))?;
    parse_catalog(&contents, format)
        .with_context(|| format!("invalid catalog file {}", path.display()))
}

/// Render a catalog in the requested format.
pub fn render_catalog(catalog: &Catalog, format: CatalogFormat) -> Result<String> {
    let document = catalog.to_document();
    Ok(match format {
        CatalogFormat::Toml => toml::to_string_pretty(&document)?,
        CatalogFormat::Json => serde_json::to_string_pretty(&document)?,
        CatalogFormat::Yaml => serde_yaml::to_string(&document)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use tempfile::tempdir;

    const TOML_CATALOG: &str = r#"
[[permissions]]
id = "view_patient_data"
name = "View Patient Data"
resource = "patients"
action = "read"

[[permissions]]
id = "manage_users"
resource = "users"
action = "write"

[[roles]]
id = "ward_manager"
name = "Ward Manager"
hierarchy = 50
is_system_role = false
permissions = ["view_patient_data", "manage_users"]
"#;

    #[test]
    fn parses_toml_catalog() {
        let catalog = parse_catalog(TOML_CATALOG, CatalogFormat::Toml).unwrap();
        assert_eq!(catalog.permission_count(), 2);
        let role = catalog.role("WARD_MANAGER").unwrap();
        assert_eq!(role.hierarchy, 50);
        assert!(role.grants("manage_users"));
    }

    #[test]
    fn parses_yaml_catalog() {
        let yaml = r#"
permissions:
  - id: view_protocols
    resource: protocols
    action: read
roles:
  - id: viewer
    hierarchy: 10
    permissions: [view_protocols]
"#;
        let catalog = parse_catalog(yaml, CatalogFormat::Yaml).unwrap();
        assert_eq!(catalog.role_permissions("VIEWER").len(), 1);
    }

    #[test]
    fn validation_errors_surface_through_context() {
        let json = r#"{"permissions": [], "roles": [{"id": "r", "permissions": ["ghost"]}]}"#;
        let err = parse_catalog(json, CatalogFormat::Json).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CatalogError>(),
            Some(&CatalogError::UnknownPermission {
                role: "r".into(),
                permission: "ghost".into()
            })
        );
    }

    #[test]
    fn loads_from_disk_and_renders_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        fs::write(&path, TOML_CATALOG).unwrap();
        let catalog = load_catalog(&path).unwrap();

        let json_path = dir.path().join("catalog.json");
        fs::write(&json_path, render_catalog(&catalog, CatalogFormat::Json).unwrap()).unwrap();
        assert_eq!(load_catalog(&json_path).unwrap(), catalog);
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = load_catalog("catalog.ini").unwrap_err();
        assert!(err.to_string().contains("unsupported catalog format"));
    }

    #[test]
    fn builtin_catalog_renders_as_toml() {
        let catalog = Catalog::clinical_default().unwrap();
        let rendered = render_catalog(&catalog, CatalogFormat::Toml).unwrap();
        assert_eq!(parse_catalog(&rendered, CatalogFormat::Toml).unwrap(), catalog);
    }
}
