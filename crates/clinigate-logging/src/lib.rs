//! ---
//! cg_section: "03-observability"
//! cg_subsection: "module"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Structured authorization log context and emitters."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
#![warn(missing_docs)]

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

/// Initialize a baseline tracing subscriber suitable for development and tests.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer())
        .try_init();
}

/// Structured context attached to authorization log events.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Label of the subject being authorized.
    pub subject: Option<&'a str>,
    /// Check being evaluated (`permission`, `any_role`, ...).
    pub check: Option<&'a str>,
    /// Permission or role identifiers the check targets.
    pub target: Option<&'a str>,
    /// Catalog revision the decision was taken against.
    pub revision: Option<u64>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a subject label.
    pub fn with_subject(mut self, subject: &'a str) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Attach the check name.
    pub fn with_check(mut self, check: &'a str) -> Self {
        self.check = Some(check);
        self
    }

    /// Attach the check target.
    pub fn with_target(mut self, target: &'a str) -> Self {
        self.target = Some(target);
        self
    }

    /// Attach a catalog revision.
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = Some(revision);
        self
    }
}

/// Outcome recorded for an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// The check allowed the subject.
    Granted,
    /// The check denied the subject.
    Denied,
}

impl AccessOutcome {
    /// Stable label used in log fields and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessOutcome::Granted => "granted",
            AccessOutcome::Denied => "denied",
        }
    }
}

/// Emit a standardized authorization decision event.
pub fn log_access_decision(context: Option<&LogContext>, event: &str, outcome: AccessOutcome) {
    let ctx = context.cloned().unwrap_or_default();
    // grants are routine; denials surface at info
    match outcome {
        AccessOutcome::Granted => tracing::event!(
            Level::DEBUG,
            event,
            outcome = outcome.as_str(),
            subject = ctx.subject.unwrap_or(""),
            check = ctx.check.unwrap_or(""),
            target = ctx.target.unwrap_or(""),
            revision = ctx.revision.unwrap_or_default()
        ),
        AccessOutcome::Denied => tracing::event!(
            Level::INFO,
            event,
            outcome = outcome.as_str(),
            subject = ctx.subject.unwrap_or(""),
            check = ctx.check.unwrap_or(""),
            target = ctx.target.unwrap_or(""),
            revision = ctx.revision.unwrap_or_default()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macros_emit_without_panic() {
        init();
        let ctx = LogContext::new()
            .with_subject("nurse-7")
            .with_check("permission");
        cg_info!(context = ctx.clone(), "catalog swapped");
        cg_debug!("debug message");
        cg_warn!(context = ctx, "rejected catalog: {}", "duplicate role");
    }

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }

    #[test]
    fn decision_helper_emits() {
        init();
        let ctx = LogContext::new()
            .with_subject("admin")
            .with_target("manage_users")
            .with_revision(3);
        log_access_decision(Some(&ctx), "authz.decision", AccessOutcome::Granted);
        log_access_decision(None, "authz.decision", AccessOutcome::Denied);
        assert_eq!(AccessOutcome::Denied.as_str(), "denied");
    }
}
