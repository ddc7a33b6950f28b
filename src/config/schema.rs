//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gatekeeper.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::admin::Role;

/// Root configuration for the gatekeeper.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatekeeperConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Page server that allowed requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Site identity: base URL, admin domain, extra allowed origins.
    pub site: SiteConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Client identification settings.
    pub security: SecurityConfig,

    /// Admin access gate settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Upstream page server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Site identity used to derive the origin allow-list.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Public base URL of the site (e.g., "https://thumbnailgpt.com").
    pub site_url: Option<String>,

    /// Host required for admin paths (e.g., "admin.thumbnailgpt.com").
    /// When unset, the admin domain check is skipped.
    pub admin_domain: Option<String>,

    /// Additional allowed origins.
    pub allowed_origins: Vec<String>,

    /// Development mode: also allow the localhost origins.
    pub development: bool,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window length in seconds.
    pub window_secs: u64,

    /// Maximum general requests per client per window.
    pub max_requests: u32,

    /// Maximum internal/API requests per client per window.
    pub max_internal_requests: u32,

    /// Value sent in the `Retry-After` header of 429 responses.
    pub retry_after_secs: u64,

    /// Interval of the expired-record sweep in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            max_requests: 100,
            max_internal_requests: 50,
            retry_after_secs: 900,
            sweep_interval_secs: 60,
        }
    }
}

/// Client identification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Use `X-Forwarded-For` / `X-Real-IP` to identify clients.
    /// Only safe behind a proxy that overwrites these headers.
    pub trust_forwarded_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            trust_forwarded_headers: true,
        }
    }
}

/// Admin access gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Cookie carrying the session token.
    pub session_cookie: String,

    /// Sessions registered at startup. Empty means nobody can reach admin pages.
    pub sessions: Vec<AdminSessionConfig>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            session_cookie: "session_token".to_string(),
            sessions: Vec::new(),
        }
    }
}

/// A session token and the user it resolves to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminSessionConfig {
    pub token: String,
    pub id: String,
    pub email: String,
    #[serde(default = "default_session_role")]
    pub role: Role,
}

fn default_session_role() -> Role {
    Role::Admin
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
