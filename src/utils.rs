//! Shared helpers

use std::net::IpAddr;

/// Extracts the best-effort client IP for rate-limit keying.
///
/// Order: first entry of X-Forwarded-For, then X-Real-IP, then the direct
/// peer address. Unidentifiable clients all land in a shared "unknown"
/// bucket rather than escaping the limiter.
pub fn extract_client_ip(headers: &axum::http::HeaderMap, direct_ip: Option<IpAddr>) -> String {
    // 1. Check X-Forwarded-For (first IP in chain)
    if let Some(forwarded_for) = headers.get("x-forwarded-for")
        && let Ok(forwarded_str) = forwarded_for.to_str()
    {
        // X-Forwarded-For can contain multiple IPs: "client, proxy1, proxy2"
        // We want the first (original client) IP
        let first_ip = forwarded_str.split(',').next().unwrap_or("").trim();
        if !first_ip.is_empty()
            && let Ok(ip) = first_ip.parse::<IpAddr>()
        {
            return normalize_ip(ip);
        }
    }

    // 2. Check X-Real-IP (single IP, often set by nginx)
    if let Some(real_ip) = headers.get("x-real-ip")
        && let Ok(real_ip_str) = real_ip.to_str()
        && let Ok(ip) = real_ip_str.trim().parse::<IpAddr>()
    {
        return normalize_ip(ip);
    }

    // 3. Fallback to direct connection IP
    if let Some(ip) = direct_ip {
        return normalize_ip(ip);
    }

    // 4. Last resort: shared bucket for unidentifiable clients
    "unknown".to_string()
}

/// Normalizes IP address to string format (removes brackets for IPv6)
fn normalize_ip(ip: IpAddr) -> String {
    ip.to_string()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_string()
}
