//! ---
//! cg_section: "02-authorization-core"
//! cg_subsection: "module"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Permission and role catalog entries."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Identifier of the capability that gates subject management.
pub const MANAGE_USERS: &str = "manage_users";

/// Atomic capability gating one action on one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    /// Stable key used for every comparison (e.g. `view_patient_data`).
    pub id: String,
    /// Human readable label.
    #[serde(default)]
    pub name: String,
    /// Human readable explanation.
    #[serde(default)]
    pub description: String,
    /// Subject area tag (e.g. `patients`).
    pub resource: String,
    /// Action tag, `read` or `write` for the built-in catalog.
    pub action: String,
}

impl Permission {
    /// Short helper for constructing a catalog entry.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Whether the permission only reads data.
    pub fn is_read(&self) -> bool {
        self.action.eq_ignore_ascii_case("read")
    }
}

/// Named bundle of permissions plus a relative privilege rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier. Catalog keys are the upper-cased form of this value.
    pub id: String,
    /// Human readable label.
    #[serde(default)]
    pub name: String,
    /// Human readable explanation.
    #[serde(default)]
    pub description: String,
    /// Permission ids granted by holding the role, in declaration order.
    #[serde(default)]
    pub permissions: IndexSet<String>,
    /// Privilege rank; only meaningful relative to other roles.
    #[serde(default)]
    pub hierarchy: u32,
    /// Built-in, non-deletable role marker.
    #[serde(default)]
    pub is_system_role: bool,
}

impl Role {
    /// Construct a role from its identifier, rank and permission ids.
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, hierarchy: u32, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            permissions: permissions.into_iter().map(Into::into).collect(),
            hierarchy,
            is_system_role: false,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the role as built-in.
    pub fn system(mut self) -> Self {
        self.is_system_role = true;
        self
    }

    /// Whether holding this role grants the permission id.
    pub fn grants(&self, permission_id: &str) -> bool {
        self.permissions.contains(permission_id)
    }
}

/// Normalise a role identifier to its catalog key.
pub(crate) fn role_key(id: &str) -> String {
    id.to_uppercase()
}
