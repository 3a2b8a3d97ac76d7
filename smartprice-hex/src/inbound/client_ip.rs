//! Caller address extraction from proxy headers.

use axum::http::HeaderMap;

/// Placeholder used when no forwarding header identifies the caller.
pub const UNKNOWN_CLIENT_IP: &str = "127.0.0.1";

/// Returns the caller's IP as reported by the proxy in front of the service.
///
/// Uses the first hop of `X-Forwarded-For`, then `X-Real-IP`.
pub fn client_ip_from_headers(headers: &HeaderMap) -> String {
    forwarded_client_ip(headers)
        .unwrap_or(UNKNOWN_CLIENT_IP)
        .to_string()
}

/// The forwarded caller address, if any header names one.
pub fn forwarded_client_ip(headers: &HeaderMap) -> Option<&str> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded.or_else(real_ip)
}
