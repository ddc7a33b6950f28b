//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits, windows, intervals > 0)
//! - Validate addresses and the site URL
//! - Surface insecure-but-legal settings as warnings
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatekeeperConfig → Result<(), Vec<ValidationError>>
//! - Warnings never block startup

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::uri::Authority;
use url::Url;

use crate::config::schema::GatekeeperConfig;
use crate::admin::Role;
use crate::security::AdminDomainPolicy;

/// A semantic configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &GatekeeperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(site_url) = &config.site.site_url {
        if Url::parse(site_url).is_err() {
            errors.push(ValidationError::new(
                "site.site_url",
                format!("not a valid URL: {site_url}"),
            ));
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {}", config.listener.bind_address),
        ));
    }

    // Hostnames are fine here; the forwarder resolves them per connection.
    if Authority::from_str(&config.upstream.address).is_err() {
        errors.push(ValidationError::new(
            "upstream.address",
            format!("not a host:port authority: {}", config.upstream.address),
        ));
    }

    let rl = &config.rate_limit;
    let positive: [(&'static str, u64); 5] = [
        ("rate_limit.window_secs", rl.window_secs),
        ("rate_limit.max_requests", u64::from(rl.max_requests)),
        ("rate_limit.max_internal_requests", u64::from(rl.max_internal_requests)),
        ("rate_limit.retry_after_secs", rl.retry_after_secs),
        ("rate_limit.sweep_interval_secs", rl.sweep_interval_secs),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    if config.admin.session_cookie.trim().is_empty() {
        errors.push(ValidationError::new("admin.session_cookie", "must not be empty"));
    }

    let mut tokens = HashSet::new();
    for session in &config.admin.sessions {
        let token = session.token.trim();
        if token.is_empty() {
            errors.push(ValidationError::new("admin.sessions.token", "must not be empty"));
        } else if !tokens.insert(token) {
            errors.push(ValidationError::new(
                "admin.sessions.token",
                format!("duplicate token for {}", session.email),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Settings that are legal but deserve an operator's attention.
pub fn config_warnings(config: &GatekeeperConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    match config.site.site_url.as_deref().map(Url::parse) {
        None => warnings.push("site.site_url is not set; only explicit allowed_origins are accepted".to_string()),
        Some(Ok(url)) if url.scheme() != "https" && !config.site.development => {
            warnings.push("site.site_url should use https in production".to_string());
        }
        _ => {}
    }

    let admin_policy = AdminDomainPolicy::from_config(config.site.admin_domain.as_deref());
    if admin_policy == AdminDomainPolicy::Unenforced {
        warnings.push(
            "site.admin_domain is not set; admin path domain checks are skipped".to_string(),
        );
    }

    if !config.admin.sessions.iter().any(|s| s.role == Role::Admin) {
        warnings.push(
            "admin.sessions has no admin entries; every admin page redirects to /".to_string(),
        );
    }

    if config.security.trust_forwarded_headers {
        warnings.push(
            "security.trust_forwarded_headers is on; clients are identified by X-Forwarded-For/X-Real-IP, \
             which is only safe behind a proxy that overwrites them"
                .to_string(),
        );
    }

    warnings
}
