//! JSON error responses.
//!
//! Every refusal the service produces is `{"error": "<message>"}` with
//! `Content-Type: application/json`. Rate-limit denials add `Retry-After`.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::security::Denial;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Build a JSON error response.
pub fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        let mut response = json_error(self.status(), self.message());
        if let Some(secs) = self.retry_after() {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
