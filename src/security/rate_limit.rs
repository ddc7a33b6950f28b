//! Fixed-window rate limiting per (client, traffic class).
//!
//! The store is an injectable trait object so a shared backend can replace
//! the in-process map. With the in-memory store every instance counts on its
//! own, so the effective global limit is `limit × instances`.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

use crate::config::RateLimitConfig;

/// Budget partition for rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrafficClass {
    /// Page navigations and everything not classified as internal.
    General,
    /// Framework-internal (RSC, prefetch, chunks) and `/api` traffic.
    Internal,
}

impl TrafficClass {
    pub fn as_str(self) -> &'static str {
        match self {
            TrafficClass::General => "general",
            TrafficClass::Internal => "internal",
        }
    }
}

impl fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a rate-limit record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    pub client: String,
    pub class: TrafficClass,
}

impl RateLimitKey {
    pub fn new(client: impl Into<String>, class: TrafficClass) -> Self {
        Self {
            client: client.into(),
            class,
        }
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.client, self.class)
    }
}

/// Request count for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub count: u32,
    /// Window expiry, epoch milliseconds.
    pub reset_time: u64,
}

impl RateLimitRecord {
    /// A record is dead once `now` is strictly past its reset time.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.reset_time
    }
}

/// Storage for rate-limit records.
///
/// Implementations must be safe to share across request tasks. A `get`
/// followed by a `set` is not atomic; small over/under-counting under
/// concurrency is tolerated.
pub trait RateLimitStore: Send + Sync {
    fn get(&self, key: &RateLimitKey) -> Option<RateLimitRecord>;

    /// Insert or overwrite the record for `key`.
    fn set(&self, key: RateLimitKey, record: RateLimitRecord);

    /// Remove every record expired at `now_ms`; returns how many were removed.
    fn delete_expired(&self, now_ms: u64) -> usize;

    /// Number of records currently held, live or not.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process store backed by a sharded concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    records: DashMap<RateLimitKey, RateLimitRecord>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn get(&self, key: &RateLimitKey) -> Option<RateLimitRecord> {
        self.records.get(key).map(|r| *r.value())
    }

    fn set(&self, key: RateLimitKey, record: RateLimitRecord) {
        self.records.insert(key, record);
    }

    fn delete_expired(&self, now_ms: u64) -> usize {
        // Collect first: removing while iterating would deadlock the shard.
        let expired: Vec<RateLimitKey> = self
            .records
            .iter()
            .filter(|r| r.value().is_expired(now_ms))
            .map(|r| r.key().clone())
            .collect();

        expired
            .into_iter()
            .filter(|key| {
                // A window renewed since collection must survive.
                self.records
                    .remove_if(key, |_, record| record.is_expired(now_ms))
                    .is_some()
            })
            .count()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// Limits applied by the [`RateLimiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub window: Duration,
    pub general_limit: u32,
    pub internal_limit: u32,
    /// Fixed `Retry-After` hint, in seconds.
    pub retry_after_secs: u64,
}

impl RateLimitPolicy {
    pub fn limit_for(&self, class: TrafficClass) -> u32 {
        match class {
            TrafficClass::General => self.general_limit,
            TrafficClass::Internal => self.internal_limit,
        }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::from(&RateLimitConfig::default())
    }
}

impl From<&RateLimitConfig> for RateLimitPolicy {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            window: Duration::from_secs(config.window_secs),
            general_limit: config.max_requests,
            internal_limit: config.max_internal_requests,
            retry_after_secs: config.retry_after_secs,
        }
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Allowed; `count` is the request's position in the current window.
    Allowed { count: u32 },
    /// Budget for this window is exhausted.
    Limited { retry_after_secs: u64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Fixed-window limiter over a shared [`RateLimitStore`].
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, policy: RateLimitPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<dyn RateLimitStore> {
        &self.store
    }

    /// Count one request for `key` at `now_ms`.
    pub fn check(&self, key: &RateLimitKey, now_ms: u64) -> RateDecision {
        let limit = self.policy.limit_for(key.class);

        match self.store.get(key) {
            Some(record) if !record.is_expired(now_ms) => {
                if record.count >= limit {
                    return RateDecision::Limited {
                        retry_after_secs: self.policy.retry_after_secs,
                    };
                }
                let count = record.count + 1;
                self.store.set(key.clone(), RateLimitRecord { count, ..record });
                RateDecision::Allowed { count }
            }
            _ => {
                let window_ms = u64::try_from(self.policy.window.as_millis()).unwrap_or(u64::MAX);
                self.store.set(
                    key.clone(),
                    RateLimitRecord {
                        count: 1,
                        reset_time: now_ms.saturating_add(window_ms),
                    },
                );
                RateDecision::Allowed { count: 1 }
            }
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
