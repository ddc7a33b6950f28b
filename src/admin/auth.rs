//! Admin access gate.
//!
//! Runs before any admin-scoped page is produced. Access needs both the
//! admin host and an admin session; anything else is redirected to `/`
//! without emitting admin content.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::admin::identity::{AdminUser, IdentityProvider};
use crate::http::response::json_error;
use crate::http::server::AppState;
use crate::security::admin_domain::ADMIN_PATH_PREFIXES;
use crate::security::AdminDomainPolicy;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized: Admin access required")]
    Unauthorized,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        json_error(StatusCode::UNAUTHORIZED, &self.to_string())
    }
}

pub struct AdminAccessGate {
    policy: AdminDomainPolicy,
    identity: Arc<dyn IdentityProvider>,
}

impl AdminAccessGate {
    pub fn new(policy: AdminDomainPolicy, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { policy, identity }
    }

    /// True only if an admin domain is configured and the `Host` contains it.
    pub fn is_admin_domain(&self, headers: &HeaderMap) -> bool {
        let host = headers
            .get("host")
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default();
        self.policy.is_admin_host(host)
    }

    /// The current user, if they are an admin.
    pub fn require_admin(&self, headers: &HeaderMap) -> Result<AdminUser, AuthError> {
        match self.identity.current_user(headers) {
            Some(user) if user.is_admin => Ok(user),
            _ => Err(AuthError::Unauthorized),
        }
    }

    pub fn validate_access(&self, headers: &HeaderMap) -> bool {
        self.is_admin_domain(headers) && self.require_admin(headers).is_ok()
    }
}

/// `/admin` and `/dashboard` page trees, exact or with a sub-path.
pub fn is_admin_scoped(path: &str) -> bool {
    ADMIN_PATH_PREFIXES.iter().any(|root| {
        path.strip_prefix(root)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

pub async fn admin_gate_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !is_admin_scoped(request.uri().path()) {
        return next.run(request).await;
    }

    if state.admin_gate.validate_access(request.headers()) {
        next.run(request).await
    } else {
        tracing::info!(path = %request.uri().path(), "Admin access denied, redirecting");
        Redirect::temporary("/").into_response()
    }
}
