//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → gate.rs (pipeline driver)
//!         → client_ip.rs (partition key)
//!         → rate_limit.rs (per client + class window)
//!         → origin.rs (Origin / Referer allow-list)
//!         → content_type.rs (POST body type)
//!         → admin_domain.rs (admin paths on admin host)
//!     → Verdict: Continue or Deny(Denial)
//!
//! Background:
//!     sweeper.rs → rate_limit.rs (purge expired records)
//! ```
//!
//! # Design Decisions
//! - Denials are values, never errors or panics
//! - Store is injected, so a shared backend can replace the in-memory map
//! - Only the admin domain check fails open, and only when unconfigured

pub mod admin_domain;
pub mod client_ip;
pub mod content_type;
pub mod denial;
pub mod gate;
pub mod origin;
pub mod rate_limit;
pub mod sweeper;

pub use admin_domain::AdminDomainPolicy;
pub use denial::{Denial, Verdict};
pub use gate::Gatekeeper;
pub use origin::AllowedOriginSet;
pub use rate_limit::{
    InMemoryRateLimitStore, RateLimitKey, RateLimitPolicy, RateLimitRecord, RateLimitStore,
    RateLimiter, TrafficClass,
};
pub use sweeper::RateLimitSweeper;
