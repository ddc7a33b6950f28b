pub mod auth;
pub mod handlers;
pub mod identity;

use axum::{middleware, routing::get, Router};

use self::auth::admin_gate_middleware;
use self::handlers::get_gatekeeper_status;
use crate::http::server::AppState;

pub use auth::{AdminAccessGate, AuthError};
pub use identity::{AdminUser, IdentityProvider, Role, SessionCookieProvider};

/// Admin-local routes plus the gate covering every admin-scoped path.
///
/// The gate is a router-wide layer so admin pages served upstream through
/// the fallback are covered as well.
pub fn setup_admin_router(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router
        .route("/admin/gatekeeper", get(get_gatekeeper_status))
        .layer(middleware::from_fn_with_state(state, admin_gate_middleware))
}
