//! Content-type validation for state-changing internal requests.

use axum::http::Method;

use crate::http::request::RequestView;
use crate::security::denial::Denial;

/// Body types accepted on internal/API POSTs (substring match).
pub const ACCEPTED_CONTENT_TYPES: &[&str] =
    &["application/json", "text/plain", "multipart/form-data"];

/// Refuse POSTs whose declared body type is not accepted. Other methods pass.
pub fn check_content_type(req: &RequestView<'_>) -> Result<(), Denial> {
    if *req.method != Method::POST {
        return Ok(());
    }

    let content_type = req.header("content-type").unwrap_or_default();
    if ACCEPTED_CONTENT_TYPES
        .iter()
        .any(|accepted| content_type.contains(accepted))
    {
        Ok(())
    } else {
        Err(Denial::InvalidContentType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    fn check(method: Method, content_type: Option<&'static str>) -> Result<(), Denial> {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert("content-type", HeaderValue::from_static(ct));
        }
        check_content_type(&RequestView::new(&method, "/api/x", &headers, None))
    }

    #[test]
    fn test_post_content_types() {
        assert_eq!(check(Method::POST, Some("application/json")), Ok(()));
        assert_eq!(check(Method::POST, Some("application/json; charset=utf-8")), Ok(()));
        assert_eq!(check(Method::POST, Some("text/plain;charset=UTF-8")), Ok(()));
        assert_eq!(
            check(Method::POST, Some("multipart/form-data; boundary=----abc")),
            Ok(())
        );
        assert_eq!(
            check(Method::POST, Some("application/xml")),
            Err(Denial::InvalidContentType)
        );
        assert_eq!(
            check(Method::POST, Some("application/x-www-form-urlencoded")),
            Err(Denial::InvalidContentType)
        );
        assert_eq!(check(Method::POST, None), Err(Denial::InvalidContentType));
    }

    #[test]
    fn test_other_methods_pass() {
        assert_eq!(check(Method::GET, Some("application/xml")), Ok(()));
        assert_eq!(check(Method::PUT, None), Ok(()));
    }
}
