//! Client identification for rate limiting.
//!
//! Forwarded headers are attacker-controlled unless a trusted proxy
//! overwrites them. With `trust_forwarded` off only the transport peer
//! address is used.

use crate::http::request::RequestView;

pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the rate-limit partition key for a request.
///
/// Priority: first `X-Forwarded-For` entry, `X-Real-IP`, peer address, `"unknown"`.
pub fn client_address(req: &RequestView<'_>, trust_forwarded: bool) -> String {
    if trust_forwarded {
        let forwarded = req
            .header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }

        if let Some(ip) = req.header("x-real-ip").map(str::trim).filter(|v| !v.is_empty()) {
            return ip.to_string();
        }
    }

    req.peer
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
