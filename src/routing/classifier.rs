//! Exclusion list and traffic classification.
//!
//! # Responsibilities
//! - Decide which paths bypass the gatekeeper entirely (static assets)
//! - Partition inspected traffic into general vs internal/API classes
//!
//! # Design Decisions
//! - Compiled once at startup, immutable at runtime
//! - `/api` paths are always inspected, even when they look static

use crate::http::request::RequestView;
use crate::routing::matcher::{
    AnyMatcher, ExtensionMatcher, HeaderFlagMatcher, Matcher, PathContainsMatcher,
    PathPrefixMatcher,
};
use crate::security::rate_limit::TrafficClass;

/// File extensions served directly by the page server.
pub const STATIC_EXTENSIONS: &[&str] = &[
    "svg", "png", "jpg", "jpeg", "gif", "webp", "ico", "css", "js", "woff", "woff2", "ttf",
    "eot", "json", "xml",
];

pub const API_PREFIX: &str = "/api/";
pub const CHUNK_PREFIX: &str = "/_next/static/chunks/";
pub const RSC_MARKER: &str = "__rsc";
pub const RSC_HEADER: &str = "rsc";
pub const PREFETCH_HEADER: &str = "next-router-prefetch";

/// Paths the gatekeeper never inspects.
#[derive(Debug)]
pub struct Exclusions {
    excluded: AnyMatcher,
}

impl Exclusions {
    pub fn new() -> Self {
        Self {
            excluded: AnyMatcher::new(vec![
                Box::new(PathPrefixMatcher::new("/_next/static")),
                Box::new(PathPrefixMatcher::new("/_next/image")),
                Box::new(PathPrefixMatcher::new("/favicon.ico")),
                Box::new(ExtensionMatcher::new(STATIC_EXTENSIONS)),
            ]),
        }
    }

    /// Returns true if the request bypasses rate limiting and origin checks.
    pub fn is_excluded(&self, req: &RequestView<'_>) -> bool {
        !is_api_path(req.path) && self.excluded.matches(req)
    }
}

impl Default for Exclusions {
    fn default() -> Self {
        Self::new()
    }
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with(API_PREFIX)
}

/// Assigns each inspected request a traffic class.
#[derive(Debug)]
pub struct TrafficClassifier {
    internal: AnyMatcher,
}

impl TrafficClassifier {
    pub fn new() -> Self {
        Self {
            internal: AnyMatcher::new(vec![
                Box::new(PathPrefixMatcher::new(CHUNK_PREFIX)),
                Box::new(PathContainsMatcher::new(RSC_MARKER)),
                Box::new(PathPrefixMatcher::new(API_PREFIX)),
                Box::new(HeaderFlagMatcher::new(RSC_HEADER, "1")),
                Box::new(HeaderFlagMatcher::new(PREFETCH_HEADER, "1")),
            ]),
        }
    }

    pub fn classify(&self, req: &RequestView<'_>) -> TrafficClass {
        if self.internal.matches(req) {
            TrafficClass::Internal
        } else {
            TrafficClass::General
        }
    }
}

impl Default for TrafficClassifier {
    fn default() -> Self {
        Self::new()
    }
}
