//! Forwarding of allowed requests to the page server.
//!
//! # Design Decisions
//! - The gatekeeper never modifies a request it lets through; only the URI
//!   is rewritten to point at the upstream
//! - Upstream failures map to 502 with the same JSON error shape as denials

use std::str::FromStr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, InvalidUri, PathAndQuery, Scheme},
        Request, StatusCode, Uri,
    },
    response::Response,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::http::response::json_error;
use crate::http::server::AppState;
use crate::observability::metrics;

/// HTTP client bound to a single upstream authority.
pub struct Upstream {
    authority: Authority,
    client: Client<HttpConnector, Body>,
}

impl Upstream {
    pub fn new(address: &str) -> Result<Self, InvalidUri> {
        let authority = Authority::from_str(address)?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self { authority, client })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub async fn forward(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let (mut parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));
        parts.uri = match Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
        {
            Ok(uri) => uri,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build upstream URI");
                return json_error(StatusCode::BAD_REQUEST, "Bad request");
            }
        };

        match self.client.request(Request::from_parts(parts, body)).await {
            Ok(response) => {
                metrics::record_upstream(response.status().as_u16(), start);
                let (parts, body) = response.into_parts();
                Response::from_parts(parts, Body::new(body))
            }
            Err(e) => {
                tracing::error!(upstream = %self.authority, error = %e, "Upstream error");
                metrics::record_upstream(StatusCode::BAD_GATEWAY.as_u16(), start);
                json_error(StatusCode::BAD_GATEWAY, "Bad gateway")
            }
        }
    }
}

/// Fallback handler: everything not served locally goes upstream.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.upstream.forward(request).await
}
