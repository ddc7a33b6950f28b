//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, headers)
//!     → classifier.rs (excluded? internal or general?)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: Excluded, or the request's TrafficClass
//! ```
//!
//! # Design Decisions
//! - Matchers compiled at startup, immutable at runtime
//! - No regex in hot path (prefix/suffix matching only)
//! - Deterministic: same input always yields the same class

pub mod classifier;
pub mod matcher;

pub use classifier::{Exclusions, TrafficClassifier};
