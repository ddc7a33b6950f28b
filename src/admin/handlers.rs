use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::admin::auth::AuthError;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct GatekeeperStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub viewer: String,
    pub rate_limit: RateLimitStatus,
    pub allowed_origins: Vec<String>,
    pub admin_domain: String,
}

#[derive(Serialize)]
pub struct RateLimitStatus {
    pub records: usize,
    pub window_secs: u64,
    pub general_limit: u32,
    pub internal_limit: u32,
}

pub async fn get_gatekeeper_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GatekeeperStatus>, AuthError> {
    let viewer = state.admin_gate.require_admin(&headers)?;
    let gatekeeper = &state.gatekeeper;
    let limiter = gatekeeper.limiter();
    let policy = limiter.policy();

    Ok(Json(GatekeeperStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        viewer: viewer.email,
        rate_limit: RateLimitStatus {
            records: limiter.store().len(),
            window_secs: policy.window.as_secs(),
            general_limit: policy.general_limit,
            internal_limit: policy.internal_limit,
        },
        allowed_origins: gatekeeper.origins().iter().map(str::to_string).collect(),
        admin_domain: gatekeeper.admin_policy().describe(),
    }))
}
