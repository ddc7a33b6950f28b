//! Origin/referer allow-listing for internal and API traffic.
//!
//! # Responsibilities
//! - Derive the allowed origin set once from site configuration
//! - Compare a request's `Origin` (or, failing that, `Referer`) against it
//!
//! # Design Decisions
//! - Comparison is on the serialized origin (scheme, host, port)
//! - Unparseable headers deny; they never surface as errors
//! - Allowed entries that are not URLs are compared verbatim

use std::collections::BTreeSet;

use url::Url;

use crate::config::SiteConfig;
use crate::http::request::RequestView;
use crate::security::denial::Denial;

/// Origins always allowed in development mode.
pub const DEVELOPMENT_ORIGINS: &[&str] = &["http://localhost:3000", "http://127.0.0.1:3000"];

/// Read-only set of origins permitted to issue internal/API requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedOriginSet {
    origins: BTreeSet<String>,
}

impl AllowedOriginSet {
    /// Build from explicit entries. Entries are trimmed and normalized; blanks are skipped.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins = entries
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.as_ref().trim();
                (!entry.is_empty()).then(|| normalize_entry(entry))
            })
            .collect();
        Self { origins }
    }

    pub fn from_config(site: &SiteConfig) -> Self {
        let mut entries: Vec<String> = Vec::new();
        if let Some(site_url) = &site.site_url {
            entries.push(site_url.clone());
        }
        if let Some(admin_domain) = site.admin_domain.as_deref().map(str::trim) {
            if !admin_domain.is_empty() {
                entries.push(format!("https://{admin_domain}"));
            }
        }
        entries.extend(site.allowed_origins.iter().cloned());
        if site.development {
            entries.extend(DEVELOPMENT_ORIGINS.iter().map(|o| o.to_string()));
        }
        Self::new(entries)
    }

    /// Membership check for an already-normalized origin.
    pub fn contains(&self, origin: &str) -> bool {
        self.origins.contains(origin)
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.origins.iter().map(String::as_str)
    }

    /// Validate the request's declared source.
    ///
    /// `Origin` wins over `Referer`; a request carrying neither is refused.
    pub fn check(&self, req: &RequestView<'_>) -> Result<(), Denial> {
        if let Some(origin) = req.header("origin") {
            return match request_origin(origin) {
                Some(origin) if self.contains(&origin) => Ok(()),
                _ => Err(Denial::InvalidOrigin),
            };
        }

        if let Some(referer) = req.header("referer") {
            return match request_origin(referer) {
                Some(origin) if self.contains(&origin) => Ok(()),
                Some(_) => Err(Denial::InvalidReferer),
                None => Err(Denial::InvalidRequest),
            };
        }

        Err(Denial::MissingOrigin)
    }
}

/// Serialized origin of a URL sent by a client; `None` if unparseable or opaque.
fn request_origin(value: &str) -> Option<String> {
    let origin = Url::parse(value.trim()).ok()?.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Normalize a configured entry. Bare hosts are assumed to be https.
fn normalize_entry(entry: &str) -> String {
    let candidate = if entry.contains("://") {
        entry.to_string()
    } else {
        format!("https://{entry}")
    };
    request_origin(&candidate).unwrap_or_else(|| entry.to_string())
}
