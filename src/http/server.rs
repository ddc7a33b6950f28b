//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the Axum router with the gatekeeper and admin gate layers
//! - Wire up request IDs, tracing and the request timeout
//! - Forward everything not served locally to the upstream page server
//! - Stop accepting on shutdown and drain in-flight requests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::uri::InvalidUri, middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::{self, AdminAccessGate, IdentityProvider};
use crate::config::GatekeeperConfig;
use crate::http::middleware::gatekeeper_middleware;
use crate::http::proxy::{proxy_handler, Upstream};
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::security::{AdminDomainPolicy, Gatekeeper, RateLimitStore};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid upstream address: {0}")]
    InvalidUpstream(#[from] InvalidUri),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Application state injected into middleware and handlers.
#[derive(Clone)]
pub struct AppState {
    pub gatekeeper: Arc<Gatekeeper>,
    pub admin_gate: Arc<AdminAccessGate>,
    pub upstream: Arc<Upstream>,
}

pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(
        config: &GatekeeperConfig,
        store: Arc<dyn RateLimitStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, ServerError> {
        let gatekeeper = Arc::new(Gatekeeper::from_config(config, store));
        let admin_gate = Arc::new(AdminAccessGate::new(
            AdminDomainPolicy::from_config(config.site.admin_domain.as_deref()),
            identity,
        ));
        let upstream = Arc::new(Upstream::new(&config.upstream.address)?);

        let state = AppState {
            gatekeeper,
            admin_gate,
            upstream,
        };

        let router = build_router(config, state.clone());
        Ok(Self { router, state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.state.upstream.authority(),
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Router with the full middleware stack.
///
/// Request order, outermost first: request ID, trace, timeout, gatekeeper,
/// admin gate, then the local admin routes or the upstream fallback.
#[allow(deprecated)]
pub fn build_router(config: &GatekeeperConfig, state: AppState) -> Router {
    let router = Router::new().fallback(proxy_handler);

    admin::setup_admin_router(router, state.clone())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gatekeeper_middleware,
        ))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.listener.request_timeout_secs,
        )))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::{Role, SessionCookieProvider};
    use crate::config::AdminSessionConfig;
    use crate::security::InMemoryRateLimitStore;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn router() -> Router {
        let mut config = GatekeeperConfig::default();
        config.site.site_url = Some("https://thumbnailgpt.com".into());
        config.site.admin_domain = Some("admin.thumbnailgpt.com".into());
        config.admin.sessions.push(AdminSessionConfig {
            token: "ops-token".into(),
            id: "1".into(),
            email: "ops@thumbnailgpt.com".into(),
            role: Role::Admin,
        });

        let server = HttpServer::new(
            &config,
            Arc::new(InMemoryRateLimitStore::new()),
            Arc::new(SessionCookieProvider::from_config(&config.admin)),
        )
        .unwrap();
        build_router(&config, server.state().clone())
    }

    #[tokio::test]
    async fn test_denial_carries_request_id() {
        let response = router()
            .oneshot(
                Request::post("/api/generate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().contains_key(&X_REQUEST_ID));
    }

    #[tokio::test]
    async fn test_status_page_with_configured_session() {
        let response = router()
            .oneshot(
                Request::get("/admin/gatekeeper")
                    .header(header::HOST, "admin.thumbnailgpt.com")
                    .header(header::COOKIE, "session_token=ops-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["viewer"], "ops@thumbnailgpt.com");
        assert_eq!(body["admin_domain"], "enforced (admin.thumbnailgpt.com)");
    }

    #[tokio::test]
    async fn test_status_page_redirects_without_session() {
        let response = router()
            .oneshot(
                Request::get("/admin/gatekeeper")
                    .header(header::HOST, "admin.thumbnailgpt.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }
}
