//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request ID, read-only request view)
//!     → middleware/ (gatekeeper pipeline, admin gate)
//!     → proxy.rs (forward to the page server)
//!     → response.rs (JSON denials)
//!     → Send to client
//! ```

pub mod middleware;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestView, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
