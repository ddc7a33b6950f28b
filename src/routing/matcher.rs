//! Request matching logic.
//!
//! # Responsibilities
//! - Match path prefixes and path fragments (case-sensitive)
//! - Match static-file extensions on the final path segment
//! - Match framework signalling headers against a sentinel value
//! - Combine conditions with OR semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Header names are case-insensitive as in HTTP, values are exact
//! - No regex to guarantee O(n) matching

use crate::http::request::RequestView;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &RequestView<'_>) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &RequestView<'_>) -> bool {
        req.path.starts_with(&self.prefix)
    }
}

/// Matches a fragment anywhere in the request path.
#[derive(Debug, Clone)]
pub struct PathContainsMatcher {
    fragment: String,
}

impl PathContainsMatcher {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
        }
    }
}

impl Matcher for PathContainsMatcher {
    fn matches(&self, req: &RequestView<'_>) -> bool {
        req.path.contains(&self.fragment)
    }
}

/// Matches paths whose final segment ends in one of the given extensions.
#[derive(Debug, Clone)]
pub struct ExtensionMatcher {
    extensions: Vec<&'static str>,
}

impl ExtensionMatcher {
    /// Extensions are given without the leading dot.
    pub fn new(extensions: &[&'static str]) -> Self {
        Self {
            extensions: extensions.to_vec(),
        }
    }
}

impl Matcher for ExtensionMatcher {
    fn matches(&self, req: &RequestView<'_>) -> bool {
        let segment = req.path.rsplit('/').next().unwrap_or_default();
        segment
            .rsplit_once('.')
            .is_some_and(|(_, ext)| self.extensions.contains(&ext))
    }
}

/// Matches a header carrying an exact sentinel value (e.g. `RSC: 1`).
#[derive(Debug, Clone)]
pub struct HeaderFlagMatcher {
    name: &'static str,
    value: &'static str,
}

impl HeaderFlagMatcher {
    pub fn new(name: &'static str, value: &'static str) -> Self {
        Self { name, value }
    }
}

impl Matcher for HeaderFlagMatcher {
    fn matches(&self, req: &RequestView<'_>) -> bool {
        req.header(self.name) == Some(self.value)
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, req: &RequestView<'_>) -> bool {
        // Any matcher may pass (OR)
        self.matchers.iter().any(|m| m.matches(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, Method};

    fn view<'a>(path: &'a str, headers: &'a HeaderMap) -> RequestView<'a> {
        RequestView::new(&Method::GET, path, headers, None)
    }

    #[test]
    fn test_path_matcher() {
        let headers = HeaderMap::new();
        let matcher = PathPrefixMatcher::new("/api/");

        assert!(matcher.matches(&view("/api/v1", &headers)));
        assert!(!matcher.matches(&view("/images", &headers)));
        assert!(!matcher.matches(&view("/API/v1", &headers))); // Case sensitive
    }

    #[test]
    fn test_extension_matcher() {
        let headers = HeaderMap::new();
        let matcher = ExtensionMatcher::new(&["png", "js", "woff2"]);

        assert!(matcher.matches(&view("/logo.png", &headers)));
        assert!(matcher.matches(&view("/fonts/inter.woff2", &headers)));
        assert!(!matcher.matches(&view("/fonts.js/page", &headers)));
        assert!(!matcher.matches(&view("/pricing", &headers)));
        assert!(!matcher.matches(&view("/logo.PNG", &headers)));
    }

    #[test]
    fn test_header_flag_matcher() {
        let matcher = HeaderFlagMatcher::new("rsc", "1");

        let mut headers = HeaderMap::new();
        headers.insert("rsc", HeaderValue::from_static("1"));
        assert!(matcher.matches(&view("/", &headers)));

        let mut headers = HeaderMap::new();
        headers.insert("rsc", HeaderValue::from_static("0"));
        assert!(!matcher.matches(&view("/", &headers)));

        assert!(!matcher.matches(&view("/", &HeaderMap::new())));
    }

    #[test]
    fn test_any_matcher() {
        let headers = HeaderMap::new();
        let matcher = AnyMatcher::new(vec![
            Box::new(PathPrefixMatcher::new("/api/")),
            Box::new(PathContainsMatcher::new("__rsc")),
        ]);

        assert!(matcher.matches(&view("/api/x", &headers)));
        assert!(matcher.matches(&view("/pricing/__rsc", &headers)));
        assert!(!matcher.matches(&view("/pricing", &headers)));
    }
}
