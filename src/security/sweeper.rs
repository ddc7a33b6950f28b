//! Background purge of expired rate-limit records.
//!
//! # Responsibilities
//! - Periodically delete records whose window has passed
//! - Bound store growth under traffic from many distinct clients
//!
//! # Design Decisions
//! - Runs on a fixed ticker, independent of request volume
//! - Owned by the process lifecycle; exits on the shutdown broadcast

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::observability::metrics;
use crate::security::rate_limit::{now_millis, RateLimitStore};

pub struct RateLimitSweeper {
    store: Arc<dyn RateLimitStore>,
    interval: Duration,
}

impl RateLimitSweeper {
    pub fn new(store: Arc<dyn RateLimitStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Run until a shutdown signal is received.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Rate limit sweeper starting");

        let mut ticker = time::interval(self.interval);
        // The first tick completes immediately; nothing can have expired yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_at(now_millis());
                }
                _ = shutdown.recv() => {
                    tracing::info!("Rate limit sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Delete everything expired at `now_ms`. Returns the number of evictions.
    pub fn sweep_at(&self, now_ms: u64) -> usize {
        let evicted = self.store.delete_expired(now_ms);
        let remaining = self.store.len();

        metrics::record_sweep(evicted, remaining);
        if evicted > 0 {
            tracing::debug!(evicted, remaining, "Swept expired rate limit records");
        }
        evicted
    }
}
