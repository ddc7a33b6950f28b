//! Gatekeeper middleware.
//! Runs the security pipeline before any handler sees the request.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::RequestView;
use crate::http::server::AppState;
use crate::security::rate_limit::now_millis;
use crate::security::Verdict;

pub async fn gatekeeper_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let verdict = state
        .gatekeeper
        .evaluate(&RequestView::from_request(&request), now_millis());

    match verdict {
        Verdict::Continue => next.run(request).await,
        Verdict::Deny(denial) => denial.into_response(),
    }
}
