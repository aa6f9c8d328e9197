//! ---
//! cg_section: "02-authorization-core"
//! cg_subsection: "module"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Prometheus counters for authorization decisions."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;

use crate::catalog::Catalog;

/// Authorization metrics exported via Prometheus.
#[derive(Clone)]
pub struct AuthzMetrics {
    registry: Arc<Registry>,
    decisions_total: IntCounterVec,
    catalog_reloads_total: IntCounter,
    catalog_roles: IntGauge,
    catalog_permissions: IntGauge,
}

impl AuthzMetrics {
    /// Register metrics with the provided registry under `namespace`.
    pub fn new(registry: Arc<Registry>, namespace: &str) -> anyhow::Result<Self> {
        let decisions_total = IntCounterVec::new(
            Opts::new("authz_decisions_total", "Authorization decisions by check and outcome")
                .namespace(namespace),
            &["check", "outcome"],
        )?;
        let catalog_reloads_total = IntCounter::with_opts(
            Opts::new("catalog_reloads_total", "Catalog swaps since start").namespace(namespace),
        )?;
        let catalog_roles = IntGauge::with_opts(
            Opts::new("catalog_roles", "Roles in the active catalog").namespace(namespace),
        )?;
        let catalog_permissions = IntGauge::with_opts(
            Opts::new("catalog_permissions", "Permissions in the active catalog")
                .namespace(namespace),
        )?;

        registry.register(Box::new(decisions_total.clone()))?;
        registry.register(Box::new(catalog_reloads_total.clone()))?;
        registry.register(Box::new(catalog_roles.clone()))?;
        registry.register(Box::new(catalog_permissions.clone()))?;

        Ok(Self {
            registry,
            decisions_total,
            catalog_reloads_total,
            catalog_roles,
            catalog_permissions,
        })
    }

    /// Access the underlying registry.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Count one decision.
    pub fn record_decision(&self, check: &str, outcome: &str) {
        self.decisions_total
            .with_label_values(&[check, outcome])
            .inc();
    }

    /// Decisions recorded for a label pair.
    pub fn decisions(&self, check: &str, outcome: &str) -> u64 {
        self.decisions_total
            .with_label_values(&[check, outcome])
            .get()
    }

    /// Refresh catalog gauges after a swap.
    pub fn observe_catalog(&self, catalog: &Catalog, reloaded: bool) {
        if reloaded {
            self.catalog_reloads_total.inc();
        }
        self.catalog_roles.set(catalog.role_count() as i64);
        self.catalog_permissions
            .set(catalog.permission_count() as i64);
    }

    /// Catalog swaps recorded so far.
    pub fn reloads(&self) -> u64 {
        self.catalog_reloads_total.get()
    }
}
