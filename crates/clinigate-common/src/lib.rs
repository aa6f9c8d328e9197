//! ---
//! cg_section: "01-core-functionality"
//! cg_subsection: "module"
//! cg_type: "source"
//! cg_scope: "code"
//! cg_description: "Shared configuration and tracing primitives."
//! cg_version: "v0.1.0"
//! cg_owner: "tbd"
//! ---
//! Shared primitives for the Clinigate workspace: configuration loading and
//! tracing subscriber setup consumed by the CLI and integration tests.

pub mod config;
pub mod logging;

pub use config::{AppConfig, CatalogConfig, LoadedAppConfig, LoggingConfig, MetricsConfig};
pub use logging::{init_tracing, LogFormat};
