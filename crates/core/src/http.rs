//! Shared HTTP utilities for Agora crates.

/// Extract the originating client IP from an `X-Forwarded-For` header value.
///
/// Takes the leftmost entry of the comma-separated chain, which is the
/// address the first proxy saw.
///
/// `X-Forwarded-For` is trivially spoofable by clients, so the result is
/// suitable for rate-limit bucketing and logging but never for
/// authorization decisions.
pub fn extract_client_ip(forwarded_for: Option<&str>) -> Option<String> {
    let first_hop = forwarded_for?.split(',').next()?.trim();
    if first_hop.is_empty() {
        None
    } else {
        Some(first_hop.to_string())
    }
}
