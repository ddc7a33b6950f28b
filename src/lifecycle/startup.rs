//! Startup orchestration.
//!
//! # Responsibilities
//! - Report configuration warnings and the effective policies
//! - Start the metrics exporter when enabled
//! - Create the rate-limit store and its sweeper
//! - Bind the listener and serve until a shutdown signal
//!
//! # Design Decisions
//! - Fail fast: a bind or upstream error is fatal
//! - The sweeper stops only after the server has drained

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::admin::SessionCookieProvider;
use crate::config::{ConfigError, GatekeeperConfig};
use crate::config::validation::config_warnings;
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::{signals::shutdown_signal, Shutdown};
use crate::observability::metrics;
use crate::security::{InMemoryRateLimitStore, RateLimitStore, RateLimitSweeper};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Run the gatekeeper until SIGINT or SIGTERM.
pub async fn run(config: GatekeeperConfig) -> Result<(), StartupError> {
    for warning in config_warnings(&config) {
        tracing::warn!("{warning}");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let store: Arc<dyn RateLimitStore> = Arc::new(InMemoryRateLimitStore::new());
    let identity = Arc::new(SessionCookieProvider::from_config(&config.admin));
    tracing::info!(sessions = identity.session_count(), "Admin sessions loaded");
    let server = HttpServer::new(&config, store.clone(), identity)?;

    let gatekeeper = &server.state().gatekeeper;
    tracing::info!(
        allowed_origins = gatekeeper.origins().len(),
        admin_domain = %gatekeeper.admin_policy().describe(),
        general_limit = config.rate_limit.max_requests,
        internal_limit = config.rate_limit.max_internal_requests,
        window_secs = config.rate_limit.window_secs,
        "Gatekeeper policies loaded"
    );

    let shutdown = Shutdown::new();

    let sweeper = RateLimitSweeper::new(
        store,
        Duration::from_secs(config.rate_limit.sweep_interval_secs),
    );
    let sweeper_task = tokio::spawn(sweeper.run(shutdown.subscribe()));

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_shutdown.trigger();
    });

    let result = server.run(listener, shutdown.subscribe()).await;

    shutdown.trigger();
    if let Err(e) = sweeper_task.await {
        tracing::error!(error = %e, "Sweeper task failed");
    }

    tracing::info!("Shutdown complete");
    result.map_err(StartupError::from)
}
