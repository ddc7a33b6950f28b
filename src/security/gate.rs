//! The request gatekeeper.
//!
//! # Pipeline
//! ```text
//! excluded static path?            → Continue (nothing counted)
//! 1. identify client               (forwarded headers / peer / "unknown")
//! 2. classify traffic              (general | internal)
//! 3. rate limit                    → 429
//! 4. origin / referer   [internal] → 403
//! 5. content type  [internal POST] → 400
//! 6. admin path domain             → 403
//! 7. Continue
//! ```
//!
//! The first denial short-circuits. Rate limiting runs before the origin
//! checks so that floods of forged requests are still counted.

use std::sync::Arc;

use crate::config::GatekeeperConfig;
use crate::http::request::RequestView;
use crate::observability::metrics;
use crate::routing::{Exclusions, TrafficClassifier};
use crate::security::admin_domain::AdminDomainPolicy;
use crate::security::client_ip::client_address;
use crate::security::content_type::check_content_type;
use crate::security::denial::{Denial, Verdict};
use crate::security::origin::AllowedOriginSet;
use crate::security::rate_limit::{
    RateDecision, RateLimitKey, RateLimitPolicy, RateLimitStore, RateLimiter, TrafficClass,
};

pub struct Gatekeeper {
    exclusions: Exclusions,
    classifier: TrafficClassifier,
    limiter: RateLimiter,
    origins: AllowedOriginSet,
    admin_policy: AdminDomainPolicy,
    trust_forwarded: bool,
}

impl Gatekeeper {
    pub fn new(
        store: Arc<dyn RateLimitStore>,
        policy: RateLimitPolicy,
        origins: AllowedOriginSet,
        admin_policy: AdminDomainPolicy,
        trust_forwarded: bool,
    ) -> Self {
        Self {
            exclusions: Exclusions::new(),
            classifier: TrafficClassifier::new(),
            limiter: RateLimiter::new(store, policy),
            origins,
            admin_policy,
            trust_forwarded,
        }
    }

    pub fn from_config(config: &GatekeeperConfig, store: Arc<dyn RateLimitStore>) -> Self {
        Self::new(
            store,
            RateLimitPolicy::from(&config.rate_limit),
            AllowedOriginSet::from_config(&config.site),
            AdminDomainPolicy::from_config(config.site.admin_domain.as_deref()),
            config.security.trust_forwarded_headers,
        )
    }

    pub fn origins(&self) -> &AllowedOriginSet {
        &self.origins
    }

    pub fn admin_policy(&self) -> &AdminDomainPolicy {
        &self.admin_policy
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Run every check against `req` at time `now_ms`.
    pub fn evaluate(&self, req: &RequestView<'_>, now_ms: u64) -> Verdict {
        if self.exclusions.is_excluded(req) {
            metrics::record_outcome("excluded");
            return Verdict::Continue;
        }

        let client = client_address(req, self.trust_forwarded);
        let class = self.classifier.classify(req);

        match self.run_checks(req, &client, class, now_ms) {
            Ok(()) => {
                metrics::record_outcome("allowed");
                Verdict::Continue
            }
            Err(denial) => {
                tracing::warn!(
                    client = %client,
                    class = %class,
                    method = %req.method,
                    path = %req.path,
                    reason = denial.reason(),
                    "Request denied"
                );
                metrics::record_outcome(denial.reason());
                if let Denial::RateLimited { .. } = denial {
                    metrics::record_rate_limited(class.as_str());
                }
                Verdict::Deny(denial)
            }
        }
    }

    fn run_checks(
        &self,
        req: &RequestView<'_>,
        client: &str,
        class: TrafficClass,
        now_ms: u64,
    ) -> Result<(), Denial> {
        let key = RateLimitKey::new(client, class);
        if let RateDecision::Limited { retry_after_secs } = self.limiter.check(&key, now_ms) {
            return Err(Denial::RateLimited { retry_after_secs });
        }

        if class == TrafficClass::Internal {
            self.origins.check(req)?;
            check_content_type(req)?;
        }

        self.admin_policy.check(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::security::rate_limit::InMemoryRateLimitStore;
    use axum::http::{HeaderMap, HeaderValue, Method};

    struct Fixture {
        gate: Gatekeeper,
        store: Arc<InMemoryRateLimitStore>,
    }

    fn fixture(admin_domain: Option<&str>) -> Fixture {
        let store = Arc::new(InMemoryRateLimitStore::new());
        let site = SiteConfig {
            site_url: Some("https://thumbnailgpt.com".into()),
            admin_domain: admin_domain.map(str::to_string),
            ..SiteConfig::default()
        };
        let gate = Gatekeeper::new(
            store.clone(),
            RateLimitPolicy::default(),
            AllowedOriginSet::from_config(&site),
            AdminDomainPolicy::from_config(admin_domain),
            true,
        );
        Fixture { gate, store }
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    fn eval(gate: &Gatekeeper, method: Method, path: &str, headers: &HeaderMap) -> Verdict {
        gate.evaluate(&RequestView::new(&method, path, headers, None), 1_000)
    }

    #[test]
    fn test_allowed_origin_passes() {
        let f = fixture(None);
        let h = headers(&[("x-forwarded-for", "1.1.1.1"), ("origin", "https://thumbnailgpt.com")]);
        assert_eq!(eval(&f.gate, Method::GET, "/api/anything", &h), Verdict::Continue);

        let h = headers(&[("x-forwarded-for", "1.1.1.1"), ("origin", "https://evil.example")]);
        assert_eq!(
            eval(&f.gate, Method::GET, "/api/anything", &h),
            Verdict::Deny(Denial::InvalidOrigin)
        );
    }

    #[test]
    fn test_missing_origin_on_api() {
        let f = fixture(None);
        let h = headers(&[("x-forwarded-for", "1.1.1.1")]);
        assert_eq!(
            eval(&f.gate, Method::GET, "/api/anything", &h),
            Verdict::Deny(Denial::MissingOrigin)
        );
    }

    #[test]
    fn test_general_pages_skip_origin_checks() {
        let f = fixture(None);
        let h = headers(&[("x-forwarded-for", "1.1.1.1")]);
        assert_eq!(eval(&f.gate, Method::GET, "/pricing", &h), Verdict::Continue);
        assert_eq!(eval(&f.gate, Method::POST, "/contact", &h), Verdict::Continue);
    }

    #[test]
    fn test_post_content_type() {
        let f = fixture(None);
        let xml = headers(&[
            ("origin", "https://thumbnailgpt.com"),
            ("content-type", "application/xml"),
        ]);
        assert_eq!(
            eval(&f.gate, Method::POST, "/api/generate", &xml),
            Verdict::Deny(Denial::InvalidContentType)
        );

        let json = headers(&[
            ("origin", "https://thumbnailgpt.com"),
            ("content-type", "application/json"),
        ]);
        assert_eq!(eval(&f.gate, Method::POST, "/api/generate", &json), Verdict::Continue);
    }

    #[test]
    fn test_origin_checked_before_content_type() {
        let f = fixture(None);
        let h = headers(&[("origin", "https://evil.example"), ("content-type", "application/xml")]);
        assert_eq!(
            eval(&f.gate, Method::POST, "/api/generate", &h),
            Verdict::Deny(Denial::InvalidOrigin)
        );
    }

    #[test]
    fn test_rate_limit_runs_first() {
        let f = fixture(None);
        let forged = headers(&[("x-forwarded-for", "6.6.6.6"), ("origin", "https://evil.example")]);

        for _ in 0..50 {
            assert_eq!(
                eval(&f.gate, Method::GET, "/api/x", &forged),
                Verdict::Deny(Denial::InvalidOrigin)
            );
        }
        assert_eq!(
            eval(&f.gate, Method::GET, "/api/x", &forged),
            Verdict::Deny(Denial::RateLimited { retry_after_secs: 900 })
        );

        let record = f
            .store
            .get(&RateLimitKey::new("6.6.6.6", TrafficClass::Internal))
            .unwrap();
        assert_eq!(record.count, 50);
    }

    #[test]
    fn test_rsc_header_counts_as_internal() {
        let f = fixture(None);
        let h = headers(&[("x-forwarded-for", "2.2.2.2"), ("rsc", "1")]);
        assert_eq!(
            eval(&f.gate, Method::GET, "/pricing", &h),
            Verdict::Deny(Denial::MissingOrigin)
        );
        assert!(f
            .store
            .get(&RateLimitKey::new("2.2.2.2", TrafficClass::Internal))
            .is_some());
    }

    #[test]
    fn test_admin_domain_gate() {
        let f = fixture(Some("admin.thumbnailgpt.com"));

        let wrong = headers(&[("host", "thumbnailgpt.com")]);
        assert_eq!(
            eval(&f.gate, Method::GET, "/admin/users", &wrong),
            Verdict::Deny(Denial::AdminDomainRequired)
        );

        let right = headers(&[("host", "admin.thumbnailgpt.com")]);
        assert_eq!(eval(&f.gate, Method::GET, "/admin/users", &right), Verdict::Continue);
    }

    #[test]
    fn test_admin_domain_unconfigured_fails_open() {
        let f = fixture(None);
        let h = headers(&[("host", "thumbnailgpt.com")]);
        assert_eq!(eval(&f.gate, Method::GET, "/dashboard", &h), Verdict::Continue);
    }

    #[test]
    fn test_excluded_paths_are_not_counted() {
        let f = fixture(Some("admin.thumbnailgpt.com"));
        let h = headers(&[("x-forwarded-for", "3.3.3.3"), ("rsc", "1")]);

        for path in ["/favicon.ico", "/_next/static/chunks/x.js", "/hero.png"] {
            for _ in 0..200 {
                assert_eq!(eval(&f.gate, Method::GET, path, &h), Verdict::Continue);
            }
        }
        assert!(f.store.is_empty());
    }

    #[test]
    fn test_api_paths_are_never_excluded() {
        let f = fixture(None);
        let h = headers(&[]);
        assert_eq!(
            eval(&f.gate, Method::GET, "/api/config.json", &h),
            Verdict::Deny(Denial::MissingOrigin)
        );
    }

    #[test]
    fn test_unknown_client_shares_a_bucket() {
        let f = fixture(None);
        let h = headers(&[]);
        eval(&f.gate, Method::GET, "/", &h);
        let record = f
            .store
            .get(&RateLimitKey::new("unknown", TrafficClass::General))
            .unwrap();
        assert_eq!(record.count, 1);
    }
}
