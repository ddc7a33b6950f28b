//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, Router};
use tokio::net::TcpListener;

use edge_gatekeeper::admin::IdentityProvider;
use edge_gatekeeper::config::GatekeeperConfig;
use edge_gatekeeper::security::{InMemoryRateLimitStore, RateLimitStore};
use edge_gatekeeper::{HttpServer, Shutdown};

pub struct MockUpstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl MockUpstream {
    /// Requests that reached the page server.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a page server that echoes `METHOD PATH` for every request.
pub async fn start_mock_upstream() -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    let app = Router::new().fallback(move |req: Request<Body>| async move {
        counter.fetch_add(1, Ordering::SeqCst);
        format!("upstream:{} {}", req.method(), req.uri().path())
    });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, hits }
}

/// Config pointing at `upstream` with the production site identity.
pub fn test_config(upstream: SocketAddr) -> GatekeeperConfig {
    let mut config = GatekeeperConfig::default();
    config.upstream.address = upstream.to_string();
    config.site.site_url = Some("https://thumbnailgpt.com".into());
    config.site.admin_domain = Some("admin.thumbnailgpt.com".into());
    config
}

pub struct RunningGatekeeper {
    pub addr: SocketAddr,
    pub store: Arc<dyn RateLimitStore>,
    pub shutdown: Shutdown,
}

impl RunningGatekeeper {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a gatekeeper on an ephemeral port.
pub async fn start_gatekeeper(
    config: GatekeeperConfig,
    identity: Arc<dyn IdentityProvider>,
) -> RunningGatekeeper {
    let store: Arc<dyn RateLimitStore> = Arc::new(InMemoryRateLimitStore::new());
    let server = HttpServer::new(&config, store.clone(), identity).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    RunningGatekeeper {
        addr,
        store,
        shutdown,
    }
}

/// Client that neither follows redirects nor uses a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
