//! Gatekeeper verdicts.

use axum::http::StatusCode;

/// Why a request was refused. Every variant is an expected outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    RateLimited { retry_after_secs: u64 },
    InvalidOrigin,
    InvalidReferer,
    /// The referer could not be parsed as a URL.
    InvalidRequest,
    MissingOrigin,
    InvalidContentType,
    AdminDomainRequired,
}

impl Denial {
    pub fn status(&self) -> StatusCode {
        match self {
            Denial::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Denial::InvalidContentType => StatusCode::BAD_REQUEST,
            Denial::InvalidOrigin
            | Denial::InvalidReferer
            | Denial::InvalidRequest
            | Denial::MissingOrigin
            | Denial::AdminDomainRequired => StatusCode::FORBIDDEN,
        }
    }

    /// Client-facing message for the JSON `error` field.
    pub fn message(&self) -> &'static str {
        match self {
            Denial::RateLimited { .. } => "Too many requests. Please try again later.",
            Denial::InvalidOrigin => "Forbidden: Invalid origin",
            Denial::InvalidReferer => "Forbidden: Invalid referer",
            Denial::InvalidRequest => "Forbidden: Invalid request",
            Denial::MissingOrigin => "Forbidden: Missing origin",
            Denial::InvalidContentType => "Invalid content type",
            Denial::AdminDomainRequired => {
                "Forbidden: Admin routes must be accessed from admin subdomain"
            }
        }
    }

    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Denial::RateLimited { .. } => "rate_limited",
            Denial::InvalidOrigin => "invalid_origin",
            Denial::InvalidReferer => "invalid_referer",
            Denial::InvalidRequest => "invalid_request",
            Denial::MissingOrigin => "missing_origin",
            Denial::InvalidContentType => "invalid_content_type",
            Denial::AdminDomainRequired => "admin_domain_required",
        }
    }

    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Denial::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }
}

/// Result of running the gatekeeper over one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Pass the request through unchanged.
    Continue,
    Deny(Denial),
}

impl Verdict {
    pub fn is_continue(&self) -> bool {
        matches!(self, Verdict::Continue)
    }
}
