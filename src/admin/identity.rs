//! Identity lookup for admin pages.
//!
//! The real session backend lives outside this service. The gate only asks
//! an [`IdentityProvider`] who the caller is and reads the answer.

use axum::http::{header, HeaderMap};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::config::AdminConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// A signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub is_admin: bool,
}

impl AdminUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role,
            is_admin: role == Role::Admin,
        }
    }
}

/// Resolves the current user of a request.
pub trait IdentityProvider: Send + Sync {
    /// `None` means no valid session.
    fn current_user(&self, headers: &HeaderMap) -> Option<AdminUser>;
}

/// Resolves a session cookie against an in-memory session table.
///
/// The table is seeded from `[[admin.sessions]]` at startup and can be
/// extended at runtime. An unknown or missing cookie yields no user.
pub struct SessionCookieProvider {
    cookie_name: String,
    sessions: DashMap<String, AdminUser>,
}

impl SessionCookieProvider {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            sessions: DashMap::new(),
        }
    }

    /// Provider seeded with the sessions listed in `[admin]`.
    pub fn from_config(config: &AdminConfig) -> Self {
        let provider = Self::new(config.session_cookie.clone());
        for session in &config.sessions {
            provider.insert_session(
                session.token.trim(),
                AdminUser::new(session.id.clone(), session.email.clone(), session.role),
            );
        }
        provider
    }

    pub fn insert_session(&self, token: impl Into<String>, user: AdminUser) {
        self.sessions.insert(token.into(), user);
    }

    /// Returns true if a session was removed.
    pub fn revoke_session(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl IdentityProvider for SessionCookieProvider {
    fn current_user(&self, headers: &HeaderMap) -> Option<AdminUser> {
        let token = session_token(headers, &self.cookie_name)?;
        self.sessions.get(token).map(|r| r.value().clone())
    }
}

/// Find a cookie by name across all `Cookie` headers.
fn session_token<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn cookies(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_is_admin_is_derived_from_role() {
        assert!(AdminUser::new("1", "a@x.com", Role::Admin).is_admin);
        assert!(!AdminUser::new("2", "u@x.com", Role::User).is_admin);
    }

    #[test]
    fn test_session_lookup() {
        let provider = SessionCookieProvider::new("session_token");
        let admin = AdminUser::new("1", "ops@thumbnailgpt.com", Role::Admin);
        provider.insert_session("abc123", admin.clone());

        assert_eq!(
            provider.current_user(&cookies("theme=dark; session_token=abc123")),
            Some(admin)
        );
        assert_eq!(provider.current_user(&cookies("session_token=nope")), None);
        assert_eq!(provider.current_user(&cookies("session_token=")), None);
        assert_eq!(provider.current_user(&HeaderMap::new()), None);

        assert!(provider.revoke_session("abc123"));
        assert_eq!(provider.current_user(&cookies("session_token=abc123")), None);
        assert_eq!(provider.session_count(), 0);
    }

    #[test]
    fn test_from_config_seeds_sessions() {
        let config: AdminConfig = toml::from_str(
            r#"
            session_cookie = "gk_session"

            [[sessions]]
            token = "ops-token"
            id = "1"
            email = "ops@thumbnailgpt.com"

            [[sessions]]
            token = "viewer-token"
            id = "2"
            email = "viewer@thumbnailgpt.com"
            role = "user"
            "#,
        )
        .unwrap();
        let provider = SessionCookieProvider::from_config(&config);

        assert_eq!(provider.session_count(), 2);
        let ops = provider.current_user(&cookies("gk_session=ops-token")).unwrap();
        assert!(ops.is_admin);
        assert_eq!(ops.email, "ops@thumbnailgpt.com");
        let viewer = provider.current_user(&cookies("gk_session=viewer-token")).unwrap();
        assert!(!viewer.is_admin);
        assert_eq!(provider.current_user(&cookies("session_token=ops-token")), None);
    }

    #[test]
    fn test_cookie_name_must_match_exactly() {
        let provider = SessionCookieProvider::new("session_token");
        provider.insert_session("abc", AdminUser::new("1", "a@x.com", Role::Admin));
        assert_eq!(provider.current_user(&cookies("old_session_token=abc")), None);
    }
}
