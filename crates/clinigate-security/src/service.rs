//! ---
//! cg_section: "02-authorization-core"
//! cg_subsection: "module"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Shareable authorization service with hot-swappable catalog."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clinigate_logging::{cg_info, log_access_decision, AccessOutcome, LogContext};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::metrics::AuthzMetrics;
use crate::resolver::AccessResolver;
use crate::subject::Subject;

#[derive(Debug)]
struct Installed {
    catalog: Arc<Catalog>,
    revision: u64,
    installed_at: DateTime<Utc>,
}

/// Catalog handle shared across callers.
///
/// Readers take the read lock only long enough to clone the inner `Arc`,
/// then resolve against that snapshot with the lock released. Reloads
/// replace the whole catalog under the write lock; nothing is mutated in
/// place.
#[derive(Debug, Clone)]
pub struct SharedCatalog {
    inner: Arc<RwLock<Installed>>,
}

impl SharedCatalog {
    /// Wrap an initial catalog as revision 1.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Installed {
                catalog: Arc::new(catalog),
                revision: 1,
                installed_at: Utc::now(),
            })),
        }
    }

    /// Current catalog.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.inner.read().catalog.clone()
    }

    /// Current catalog together with its revision.
    pub fn versioned(&self) -> (Arc<Catalog>, u64) {
        let installed = self.inner.read();
        (installed.catalog.clone(), installed.revision)
    }

    /// Revision of the installed catalog, starting at 1.
    pub fn revision(&self) -> u64 {
        self.inner.read().revision
    }

    /// When the installed catalog was swapped in.
    pub fn installed_at(&self) -> DateTime<Utc> {
        self.inner.read().installed_at
    }

    /// Atomically install a new catalog and return its revision.
    pub fn replace(&self, catalog: Catalog) -> u64 {
        let mut installed = self.inner.write();
        installed.catalog = Arc::new(catalog);
        installed.revision += 1;
        installed.installed_at = Utc::now();
        installed.revision
    }
}

/// Requirement a caller wants a subject to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ids", rename_all = "snake_case")]
pub enum Requirement {
    /// A single permission.
    Permission(String),
    /// At least one of the permissions.
    AnyPermission(Vec<String>),
    /// Every one of the permissions.
    AllPermissions(Vec<String>),
    /// Literal membership of a role.
    Role(String),
    /// Literal membership of at least one role.
    AnyRole(Vec<String>),
}

impl Requirement {
    /// Shorthand for [`Requirement::Permission`].
    pub fn permission(id: impl Into<String>) -> Self {
        Requirement::Permission(id.into())
    }

    /// Name of the check, used as log field and metric label.
    pub fn check(&self) -> &'static str {
        match self {
            Requirement::Permission(_) => "permission",
            Requirement::AnyPermission(_) => "any_permission",
            Requirement::AllPermissions(_) => "all_permissions",
            Requirement::Role(_) => "role",
            Requirement::AnyRole(_) => "any_role",
        }
    }

    fn evaluate(&self, resolver: &AccessResolver<'_>, subject: Option<&Subject>) -> bool {
        match self {
            Requirement::Permission(id) => resolver.has_permission(subject, id),
            Requirement::AnyPermission(ids) => resolver.has_any_permission(subject, ids),
            Requirement::AllPermissions(ids) => resolver.has_all_permissions(subject, ids),
            Requirement::Role(id) => resolver.has_role(subject, id),
            Requirement::AnyRole(ids) => resolver.has_any_role(subject, ids),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Permission(id) | Requirement::Role(id) => {
                write!(f, "{} {}", self.check(), id)
            }
            Requirement::AnyPermission(ids)
            | Requirement::AllPermissions(ids)
            | Requirement::AnyRole(ids) => write!(f, "{} [{}]", self.check(), ids.join(", ")),
        }
    }
}

/// Result of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// The subject satisfies the requirement.
    Allow,
    /// Anything else.
    Deny,
}

impl Decision {
    /// Whether the decision allows access.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    fn outcome(&self) -> AccessOutcome {
        match self {
            Decision::Allow => AccessOutcome::Granted,
            Decision::Deny => AccessOutcome::Denied,
        }
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Raised by [`AuthorizationService::ensure`] when a requirement is not met.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("access denied for {subject}: requires {requirement}")]
pub struct AccessDenied {
    /// Subject label, `anonymous` when absent.
    pub subject: String,
    /// The unmet requirement.
    pub requirement: Requirement,
}

/// Entry point for route guards and middleware.
#[derive(Clone)]
pub struct AuthorizationService {
    catalog: SharedCatalog,
    metrics: Option<AuthzMetrics>,
}

impl AuthorizationService {
    /// Service resolving against the shared catalog.
    pub fn new(catalog: SharedCatalog) -> Self {
        Self {
            catalog,
            metrics: None,
        }
    }

    /// Attach Prometheus counters.
    pub fn with_metrics(mut self, metrics: AuthzMetrics) -> Self {
        metrics.observe_catalog(&self.catalog.snapshot(), false);
        self.metrics = Some(metrics);
        self
    }

    /// Shared catalog handle.
    pub fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    /// Install a new catalog for subsequent decisions.
    pub fn reload(&self, catalog: Catalog) -> u64 {
        let roles = catalog.role_count();
        let permissions = catalog.permission_count();
        if let Some(metrics) = &self.metrics {
            metrics.observe_catalog(&catalog, true);
        }
        let revision = self.catalog.replace(catalog);
        cg_info!(
            context = LogContext::new().with_revision(revision),
            "catalog installed at {}: {} roles, {} permissions",
            self.catalog.installed_at().to_rfc3339(),
            roles,
            permissions
        );
        revision
    }

    /// Decide whether `subject` meets `requirement`.
    pub fn authorize(&self, subject: Option<&Subject>, requirement: &Requirement) -> Decision {
        let (catalog, revision) = self.catalog.versioned();
        let resolver = AccessResolver::new(&catalog);
        let decision = Decision::from(requirement.evaluate(&resolver, subject));
        let target = requirement.to_string();
        self.record(subject, requirement.check(), &target, revision, decision);
        decision
    }

    /// Like [`authorize`](Self::authorize) but returns an error on denial.
    pub fn ensure(
        &self,
        subject: Option<&Subject>,
        requirement: &Requirement,
    ) -> Result<(), AccessDenied> {
        match self.authorize(subject, requirement) {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(AccessDenied {
                subject: label(subject).to_owned(),
                requirement: requirement.clone(),
            }),
        }
    }

    /// Decide whether `acting` may manage `target`.
    pub fn can_manage_user(&self, acting: Option<&Subject>, target: Option<&Subject>) -> Decision {
        let (catalog, revision) = self.catalog.versioned();
        let resolver = AccessResolver::new(&catalog);
        let decision = Decision::from(resolver.can_manage_user(acting, target));
        self.record(acting, "manage_user", label(target), revision, decision);
        decision
    }

    fn record(
        &self,
        subject: Option<&Subject>,
        check: &str,
        target: &str,
        revision: u64,
        decision: Decision,
    ) {
        let context = LogContext::new()
            .with_subject(label(subject))
            .with_check(check)
            .with_target(target)
            .with_revision(revision);
        log_access_decision(Some(&context), "authz.decision", decision.outcome());
        if let Some(metrics) = &self.metrics {
            metrics.record_decision(check, decision.outcome().as_str());
        }
    }
}

fn label(subject: Option<&Subject>) -> &str {
    subject.map(Subject::label).unwrap_or("anonymous")
}
