//! ---
//! cg_section: "02-authorization-core"
//! cg_subsection: "module"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Compiled-in clinical permission and role catalog."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
use crate::catalog::{Catalog, CatalogError};
use crate::rbac::{Permission, Role};

// (id, name, description, resource, action)
const PERMISSIONS: &[(&str, &str, &str, &str, &str)] = &[
    ("view_patient_data", "View Patient Data", "Read patient demographics and clinical records", "patients", "read"),
    ("edit_patient_data", "Edit Patient Data", "Update patient demographics and clinical records", "patients", "write"),
    ("view_medications", "View Medications", "Read medication lists and interaction reports", "medications", "read"),
    ("prescribe_medications", "Prescribe Medications", "Create and modify prescriptions", "medications", "write"),
    ("dispense_medications", "Dispense Medications", "Record medication dispensing", "medications", "write"),
    ("view_protocols", "View Protocols", "Browse treatment protocols", "protocols", "read"),
    ("manage_protocols", "Manage Protocols", "Create, edit and retire treatment protocols", "protocols", "write"),
    ("view_assessments", "View Assessments", "Read cognitive assessment results", "assessments", "read"),
    ("conduct_assessments", "Conduct Assessments", "Administer and score cognitive assessments", "assessments", "write"),
    ("view_analytics", "View Analytics", "Access aggregate dashboards", "analytics", "read"),
    ("export_data", "Export Data", "Export de-identified datasets", "analytics", "read"),
    ("view_audit_logs", "View Audit Logs", "Read access and change audit trails", "audit", "read"),
    ("manage_users", "Manage Users", "Create, edit and deactivate user accounts", "users", "write"),
    ("manage_roles", "Manage Roles", "Edit role definitions and assignments", "users", "write"),
    ("manage_system_settings", "Manage System Settings", "Change platform-wide configuration", "system", "write"),
];

const ADMIN: &[&str] = &[
    "view_patient_data",
    "view_medications",
    "view_protocols",
    "view_assessments",
    "view_analytics",
    "export_data",
    "view_audit_logs",
    "manage_users",
    "manage_roles",
];

const ONCOLOGIST: &[&str] = &[
    "view_patient_data",
    "edit_patient_data",
    "view_medications",
    "prescribe_medications",
    "view_protocols",
    "manage_protocols",
    "view_assessments",
    "conduct_assessments",
    "view_analytics",
];

const PHYSICIAN: &[&str] = &[
    "view_patient_data",
    "edit_patient_data",
    "view_medications",
    "prescribe_medications",
    "view_protocols",
    "view_assessments",
    "conduct_assessments",
    "view_analytics",
];

const PHARMACIST: &[&str] = &[
    "view_patient_data",
    "edit_patient_data",
    "view_medications",
    "dispense_medications",
    "view_protocols",
];

const NURSE: &[&str] = &[
    "view_patient_data",
    "edit_patient_data",
    "view_medications",
    "view_protocols",
    "view_assessments",
    "conduct_assessments",
];

const RESEARCHER: &[&str] = &["view_protocols", "view_assessments", "view_analytics", "export_data"];

const VIEWER: &[&str] = &["view_protocols"];

/// Built-in permission entries.
pub fn permissions() -> Vec<Permission> {
    PERMISSIONS
        .iter()
        .map(|(id, name, description, resource, action)| {
            Permission::new(*id, *name, *description, *resource, *action)
        })
        .collect()
}

/// Built-in role entries, all marked as system roles.
pub fn roles() -> Vec<Role> {
    let everything = PERMISSIONS.iter().map(|(id, ..)| *id);
    vec![
        Role::new("SUPER_ADMIN", "Super Administrator", 100, everything)
            .with_description("Unrestricted platform access")
            .system(),
        Role::new("ADMIN", "Administrator", 90, ADMIN.iter().copied())
            .with_description("User and role administration")
            .system(),
        Role::new("ONCOLOGIST", "Oncologist", 70, ONCOLOGIST.iter().copied())
            .with_description("Oncology care and protocol ownership")
            .system(),
        Role::new("PHYSICIAN", "Physician", 70, PHYSICIAN.iter().copied())
            .with_description("General clinical care and prescribing")
            .system(),
        Role::new("PHARMACIST", "Pharmacist", 60, PHARMACIST.iter().copied())
            .with_description("Medication review and dispensing")
            .system(),
        Role::new("NURSE", "Nurse", 40, NURSE.iter().copied())
            .with_description("Bedside care and assessments")
            .system(),
        Role::new("RESEARCHER", "Researcher", 30, RESEARCHER.iter().copied())
            .with_description("Aggregate analytics and exports")
            .system(),
        Role::new("VIEWER", "Viewer", 10, VIEWER.iter().copied())
            .with_description("Read-only protocol browsing")
            .system(),
    ]
}

impl Catalog {
    /// The compiled-in clinical catalog.
    pub fn clinical_default() -> Result<Self, CatalogError> {
        Catalog::new(permissions(), roles())
    }
}
