//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! gatekeeper.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (overlay SITE_URL, ADMIN_DOMAIN, ALLOWED_ORIGINS, APP_ENV, ...)
//!     → validation.rs (semantic checks, warnings)
//!     → GatekeeperConfig (validated, immutable)
//!     → consumed once at startup to build the gatekeeper
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the origin allow-list is derived once
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_config, ConfigError};
pub use schema::{
    AdminConfig, AdminSessionConfig, GatekeeperConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    RateLimitConfig, SecurityConfig, SiteConfig, UpstreamConfig,
};
