//! Admin-path domain policy.
//!
//! Admin and dashboard paths must be reached through the admin host. When no
//! admin domain is configured the check is skipped; that state is explicit
//! in [`AdminDomainPolicy::Unenforced`] and logged at startup.

use crate::http::request::RequestView;
use crate::security::denial::Denial;

/// Path prefixes guarded by the admin domain.
pub const ADMIN_PATH_PREFIXES: &[&str] = &["/admin", "/dashboard"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminDomainPolicy {
    /// Admin paths require a `Host` containing this domain.
    Enforced(String),
    /// No admin domain configured; admin paths are not host-checked.
    Unenforced,
}

impl AdminDomainPolicy {
    pub fn from_config(admin_domain: Option<&str>) -> Self {
        match admin_domain.map(str::trim) {
            Some(domain) if !domain.is_empty() => AdminDomainPolicy::Enforced(domain.to_string()),
            _ => AdminDomainPolicy::Unenforced,
        }
    }

    pub fn domain(&self) -> Option<&str> {
        match self {
            AdminDomainPolicy::Enforced(domain) => Some(domain),
            AdminDomainPolicy::Unenforced => None,
        }
    }

    /// True only when a domain is configured and `host` contains it.
    pub fn is_admin_host(&self, host: &str) -> bool {
        self.domain().is_some_and(|domain| host.contains(domain))
    }

    pub fn check(&self, req: &RequestView<'_>) -> Result<(), Denial> {
        if !is_admin_path(req.path) {
            return Ok(());
        }

        match self {
            AdminDomainPolicy::Enforced(_) => {
                let host = req.header("host").unwrap_or_default();
                if self.is_admin_host(host) {
                    Ok(())
                } else {
                    Err(Denial::AdminDomainRequired)
                }
            }
            AdminDomainPolicy::Unenforced => {
                tracing::debug!(path = %req.path, "Admin domain unset, skipping host check");
                Ok(())
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            AdminDomainPolicy::Enforced(domain) => format!("enforced ({domain})"),
            AdminDomainPolicy::Unenforced => "unenforced".to_string(),
        }
    }
}

pub fn is_admin_path(path: &str) -> bool {
    ADMIN_PATH_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}
