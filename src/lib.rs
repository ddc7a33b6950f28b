//! Edge request gatekeeper for the thumbnail-gen marketing site.
//!
//! Every request passes rate limiting, origin and referer checks, content
//! type checks and the admin domain gate before it reaches the page server.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::GatekeeperConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
