//! Request inspection and request IDs.
//!
//! # Responsibilities
//! - Provide a borrowed, read-only view of a request for the gatekeeper
//! - Generate unique request IDs (UUID v4)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The gatekeeper never mutates the request; it only reads this view

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, HeaderName, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// What the gatekeeper sees of an inbound request.
#[derive(Debug, Clone, Copy)]
pub struct RequestView<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub headers: &'a HeaderMap,
    /// Transport peer address, when the listener provides one.
    pub peer: Option<IpAddr>,
}

impl<'a> RequestView<'a> {
    pub fn new(
        method: &'a Method,
        path: &'a str,
        headers: &'a HeaderMap,
        peer: Option<IpAddr>,
    ) -> Self {
        Self {
            method,
            path,
            headers,
            peer,
        }
    }

    /// Build a view from an axum request, picking up `ConnectInfo` if present.
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Self::new(req.method(), req.uri().path(), req.headers(), peer)
    }

    /// Header value as a string; non-UTF-8 values are treated as absent.
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Generates a UUID v4 for every request lacking an `X-Request-ID`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_view_reads_connect_info() {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri("http://example.com/api/upload?x=1")
            .header("Origin", "https://thumbnailgpt.com")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo::<SocketAddr>("10.1.2.3:5555".parse().unwrap()));

        let view = RequestView::from_request(&req);
        assert_eq!(*view.method, Method::POST);
        assert_eq!(view.path, "/api/upload");
        assert_eq!(view.header("origin"), Some("https://thumbnailgpt.com"));
        assert_eq!(view.peer, Some("10.1.2.3".parse().unwrap()));
    }

    #[test]
    fn test_request_ids_are_unique() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let mut maker = MakeRequestUuid;
        let a = maker.make_request_id(&req).unwrap();
        let b = maker.make_request_id(&req).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
