//! ---
//! cg_section: "05-external-interfaces"
//! cg_subsection: "binary"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Subject authorization subcommands."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use clinigate_security::{AccessResolver, Decision, Permission, Requirement, Subject};
use serde::Serialize;

use crate::Runtime;

/// Exit status reported when a decision denies.
const DENIED: u8 = 2;

/// Subject described on the command line or in a JSON document.
#[derive(Debug, Clone, Args)]
pub struct SubjectArgs {
    /// Assigned role id (repeatable).
    #[arg(long = "role", value_name = "ROLE")]
    roles: Vec<String>,
    /// Directly granted permission id (repeatable).
    #[arg(long = "grant", value_name = "PERMISSION")]
    grants: Vec<String>,
    /// JSON subject document; flags are appended to it.
    #[arg(long = "subject-file", value_name = "FILE")]
    subject_file: Option<PathBuf>,
    /// Label used in log output.
    #[arg(long, value_name = "LABEL")]
    label: Option<String>,
}

impl SubjectArgs {
    fn into_subject(self) -> Result<Subject> {
        let mut subject = match &self.subject_file {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read subject {}", path.display()))?;
                serde_json::from_str::<Subject>(&raw)
                    .with_context(|| format!("failed to parse subject {}", path.display()))?
            }
            None => Subject::default(),
        };
        subject.roles.extend(self.roles);
        subject.permissions.extend(self.grants);
        if let Some(label) = self.label {
            subject.id = Some(label);
        }
        Ok(subject)
    }
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    subject: &'a str,
    requirement: &'a Requirement,
    decision: Decision,
}

#[derive(Debug, Serialize)]
struct PermissionsReport<'a> {
    subject: &'a str,
    hierarchy: u32,
    permissions: Vec<&'a Permission>,
}

#[derive(Debug, Serialize)]
struct ManageReport {
    actor_hierarchy: u32,
    target_hierarchy: u32,
    decision: Decision,
}

fn exit_for(decision: Decision) -> ExitCode {
    match decision {
        Decision::Allow => ExitCode::SUCCESS,
        Decision::Deny => ExitCode::from(DENIED),
    }
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("requirement")
        .required(true)
        .args(["permission", "any_permission", "all_permissions", "has_role", "has_any_role"])
))]
pub struct CheckCommand {
    #[command(flatten)]
    subject: SubjectArgs,
    /// Require a single permission.
    #[arg(long, value_name = "PERMISSION")]
    permission: Option<String>,
    /// Require at least one of the permissions.
    #[arg(long, value_name = "PERMISSION", num_args = 1.., value_delimiter = ',')]
    any_permission: Option<Vec<String>>,
    /// Require all of the permissions; pass an empty value for the vacuous case.
    #[arg(long, value_name = "PERMISSION", num_args = 0.., value_delimiter = ',')]
    all_permissions: Option<Vec<String>>,
    /// Require literal membership of a role.
    #[arg(long, value_name = "ROLE")]
    has_role: Option<String>,
    /// Require literal membership of at least one role.
    #[arg(long, value_name = "ROLE", num_args = 1.., value_delimiter = ',')]
    has_any_role: Option<Vec<String>>,
}

impl CheckCommand {
    fn requirement(&self) -> Option<Requirement> {
        if let Some(id) = &self.permission {
            return Some(Requirement::Permission(id.clone()));
        }
        if let Some(ids) = &self.any_permission {
            return Some(Requirement::AnyPermission(ids.clone()));
        }
        if let Some(ids) = &self.all_permissions {
            return Some(Requirement::AllPermissions(ids.clone()));
        }
        if let Some(id) = &self.has_role {
            return Some(Requirement::Role(id.clone()));
        }
        self.has_any_role.clone().map(Requirement::AnyRole)
    }

    pub fn execute(self, runtime: &Runtime) -> Result<ExitCode> {
        let requirement = self
            .requirement()
            .context("a requirement flag is mandatory")?;
        let subject = self.subject.into_subject()?;
        let decision = runtime.service.authorize(Some(&subject), &requirement);
        let report = CheckReport {
            subject: subject.label(),
            requirement: &requirement,
            decision,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(exit_for(decision))
    }
}

#[derive(Debug, Args)]
pub struct PermissionsCommand {
    #[command(flatten)]
    subject: SubjectArgs,
}

impl PermissionsCommand {
    pub fn execute(self, runtime: &Runtime) -> Result<ExitCode> {
        let subject = self.subject.into_subject()?;
        let catalog = runtime.catalog();
        let resolver = AccessResolver::new(&catalog);
        let report = PermissionsReport {
            subject: subject.label(),
            hierarchy: resolver.user_hierarchy_level(Some(&subject)),
            permissions: resolver.user_permissions(Some(&subject)),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Debug, Args)]
pub struct CanManageCommand {
    /// Acting subject role (repeatable).
    #[arg(long = "actor-role", value_name = "ROLE")]
    actor_roles: Vec<String>,
    /// Acting subject direct grant (repeatable).
    #[arg(long = "actor-grant", value_name = "PERMISSION")]
    actor_grants: Vec<String>,
    /// Target subject role (repeatable).
    #[arg(long = "target-role", value_name = "ROLE")]
    target_roles: Vec<String>,
    /// Target subject direct grant (repeatable).
    #[arg(long = "target-grant", value_name = "PERMISSION")]
    target_grants: Vec<String>,
}

impl CanManageCommand {
    pub fn execute(self, runtime: &Runtime) -> Result<ExitCode> {
        let actor = Subject::with_roles(self.actor_roles)
            .granting(self.actor_grants)
            .labelled("actor");
        let target = Subject::with_roles(self.target_roles)
            .granting(self.target_grants)
            .labelled("target");
        let decision = runtime.service.can_manage_user(Some(&actor), Some(&target));
        let catalog = runtime.catalog();
        let resolver = AccessResolver::new(&catalog);
        let report = ManageReport {
            actor_hierarchy: resolver.user_hierarchy_level(Some(&actor)),
            target_hierarchy: resolver.user_hierarchy_level(Some(&target)),
            decision,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(exit_for(decision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        check: CheckCommand,
    }

    #[test]
    fn parses_any_permission_list() {
        let harness = Harness::try_parse_from([
            "check",
            "--role",
            "nurse",
            "--any-permission",
            "view_patient_data,prescribe_medications",
        ])
        .unwrap();
        assert_eq!(
            harness.check.requirement(),
            Some(Requirement::AnyPermission(vec![
                "view_patient_data".into(),
                "prescribe_medications".into()
            ]))
        );
    }

    #[test]
    fn requirement_flags_are_exclusive() {
        let result = Harness::try_parse_from([
            "check",
            "--permission",
            "view_patient_data",
            "--has-role",
            "NURSE",
        ]);
        assert!(result.is_err());
        assert!(Harness::try_parse_from(["check", "--role", "nurse"]).is_err());
    }

    #[test]
    fn check_report_serializes_tagged_requirement() {
        let requirement = Requirement::permission("view_audit_logs");
        let report = CheckReport {
            subject: "auditor",
            requirement: &requirement,
            decision: Decision::Deny,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["requirement"]["kind"], "permission");
        assert_eq!(value["requirement"]["ids"], "view_audit_logs");
        assert_eq!(value["decision"], "deny");
    }

    #[test]
    fn subject_file_is_merged_with_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subject.json");
        fs::write(&path, r#"{"id": "p-4", "roles": "not-a-list", "permissions": ["export_data"]}"#)
            .unwrap();
        let args = SubjectArgs {
            roles: vec!["pharmacist".into()],
            grants: vec![],
            subject_file: Some(path),
            label: None,
        };
        let subject = args.into_subject().unwrap();
        assert_eq!(subject.roles, vec!["pharmacist"]);
        assert_eq!(subject.permissions, vec!["export_data"]);
        assert_eq!(subject.label(), "p-4");
    }
}
