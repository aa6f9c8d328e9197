//! ---
//! cg_section: "03-observability"
//! cg_subsection: "module"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Logging macros carrying authorization context."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
/// Emit an informational log enriched with authorization context.
#[macro_export]
macro_rules! cg_info {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::INFO,
            subject = ctx.subject.unwrap_or(""),
            check = ctx.check.unwrap_or(""),
            target = ctx.target.unwrap_or(""),
            revision = ctx.revision.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {
        $crate::cg_info!(context = $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit a debug log enriched with authorization context.
#[macro_export]
macro_rules! cg_debug {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::DEBUG,
            subject = ctx.subject.unwrap_or(""),
            check = ctx.check.unwrap_or(""),
            target = ctx.target.unwrap_or(""),
            revision = ctx.revision.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {
        $crate::cg_debug!(context = $crate::LogContext::default(), $($arg)+)
    };
}

/// Emit a warning enriched with authorization context.
#[macro_export]
macro_rules! cg_warn {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::WARN,
            subject = ctx.subject.unwrap_or(""),
            check = ctx.check.unwrap_or(""),
            target = ctx.target.unwrap_or(""),
            revision = ctx.revision.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {
        $crate::cg_warn!(context = $crate::LogContext::default(), $($arg)+)
    };
}
