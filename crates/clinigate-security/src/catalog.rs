//! ---
//! cg_section: "02-authorization-core"
//! cg_subsection: "module"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Immutable permission and role catalog."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
//! The catalog is built once, validated, and only read afterwards. Every
//! lookup degrades to `None`, an empty list or `false` so that callers deny
//! by default instead of handling faults.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rbac::{role_key, Permission, Role};

/// Errors raised while assembling a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A permission or role carried an empty identifier.
    #[error("{kind} with empty identifier")]
    EmptyId {
        /// `permission` or `role`.
        kind: &'static str,
    },
    /// Two permissions share an identifier.
    #[error("duplicate permission id: {0}")]
    DuplicatePermission(String),
    /// Two roles share an identifier once upper-cased.
    #[error("duplicate role id: {0}")]
    DuplicateRole(String),
    /// A role references a permission missing from the catalog.
    #[error("role {role} references unknown permission {permission}")]
    UnknownPermission {
        /// Offending role.
        role: String,
        /// Missing permission id.
        permission: String,
    },
}

/// Serializable catalog document, the shape consumed by loaders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Permission entries.
    #[serde(default)]
    pub permissions: Vec<Permission>,
    /// Role entries.
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Validated, read-only catalog of permissions and roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    permissions: IndexMap<String, Permission>,
    roles: IndexMap<String, Role>,
}

impl Catalog {
    /// Build a catalog, checking identifier uniqueness and role references.
    pub fn new(
        permissions: impl IntoIterator<Item = Permission>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<Self, CatalogError> {
        let mut permission_map = IndexMap::new();
        for permission in permissions {
            if permission.id.is_empty() {
                return Err(CatalogError::EmptyId { kind: "permission" });
            }
            if permission_map.contains_key(&permission.id) {
                return Err(CatalogError::DuplicatePermission(permission.id));
            }
            permission_map.insert(permission.id.clone(), permission);
        }

        let mut role_map = IndexMap::new();
        for role in roles {
            if role.id.is_empty() {
                return Err(CatalogError::EmptyId { kind: "role" });
            }
            let key = role_key(&role.id);
            if role_map.contains_key(&key) {
                return Err(CatalogError::DuplicateRole(role.id));
            }
            if let Some(missing) = role
                .permissions
                .iter()
                .find(|id| !permission_map.contains_key(id.as_str()))
            {
                return Err(CatalogError::UnknownPermission {
                    role: role.id.clone(),
                    permission: missing.clone(),
                });
            }
            role_map.insert(key, role);
        }

        Ok(Self {
            permissions: permission_map,
            roles: role_map,
        })
    }

    /// Build a catalog from a deserialized document.
    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        Self::new(document.permissions, document.roles)
    }

    /// Convert back into a serializable document.
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            permissions: self.permissions.values().cloned().collect(),
            roles: self.roles.values().cloned().collect(),
        }
    }

    /// Exact lookup of a permission.
    pub fn permission(&self, id: &str) -> Option<&Permission> {
        self.permissions.get(id)
    }

    /// Lookup of a role, ignoring the case of `id`.
    pub fn role(&self, id: &str) -> Option<&Role> {
        self.roles.get(&role_key(id))
    }

    /// Resolve a role to its permission records. Unknown roles yield nothing.
    pub fn role_permissions(&self, role_id: &str) -> Vec<&Permission> {
        self.role(role_id)
            .map(|role| {
                role.permissions
                    .iter()
                    .filter_map(|id| self.permission(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Map every catalog permission to whether `role_id` grants it.
    ///
    /// An unknown role produces a matrix where every entry is `false`.
    pub fn permission_matrix(&self, role_id: &str) -> IndexMap<String, bool> {
        let role = self.role(role_id);
        self.permissions
            .keys()
            .map(|id| (id.clone(), role.is_some_and(|role| role.grants(id))))
            .collect()
    }

    /// Permissions in declaration order.
    pub fn permissions(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.values()
    }

    /// Roles in declaration order.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    /// Permissions grouped by their resource tag, first-seen order.
    pub fn permissions_by_resource(&self) -> IndexMap<&str, Vec<&Permission>> {
        let mut grouped: IndexMap<&str, Vec<&Permission>> = IndexMap::new();
        for permission in self.permissions.values() {
            grouped
                .entry(permission.resource.as_str())
                .or_default()
                .push(permission);
        }
        grouped
    }

    /// Roles ordered from most to least privileged; ties keep declaration order.
    pub fn roles_by_hierarchy(&self) -> Vec<&Role> {
        let mut roles: Vec<&Role> = self.roles.values().collect();
        roles.sort_by(|a, b| b.hierarchy.cmp(&a.hierarchy));
        roles
    }

    /// Number of permissions.
    pub fn permission_count(&self) -> usize {
        self.permissions.len()
    }

    /// Number of roles.
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }
}
