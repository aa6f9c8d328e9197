//! ---
//! cg_section: "02-authorization-core"
//! cg_subsection: "module"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Role-based access control for the clinical platform."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
//! Authorization core: a validated permission/role catalog and pure
//! resolution functions answering allow/deny questions about subjects.
//! Unknown identifiers and absent subjects always resolve to deny.
#![warn(missing_docs)]

pub mod builtin;
pub mod catalog;
pub mod loader;
pub mod metrics;
pub mod rbac;
pub mod resolver;
pub mod service;
pub mod subject;

pub use catalog::{Catalog, CatalogDocument, CatalogError};
pub use loader::{load_catalog, parse_catalog, render_catalog, CatalogFormat};
pub use metrics::AuthzMetrics;
pub use rbac::{Permission, Role, MANAGE_USERS};
pub use resolver::AccessResolver;
pub use service::{AccessDenied, AuthorizationService, Decision, Requirement, SharedCatalog};
pub use subject::Subject;
