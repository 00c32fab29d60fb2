//! Validation for recording URLs received in telephony callbacks.
//!
//! The recording URL arrives in an unauthenticated request body and is fetched
//! server-side before transcription, so it is checked for SSRF the same way any
//! outbound callback target would be: HTTPS only, a DNS name rather than a raw IP,
//! and no resolved address inside private, loopback, or link-local ranges.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;
use tracing::warn;
use url::Url;

#[derive(Debug, Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(#[from] url::ParseError),

    #[error("URL scheme must be HTTPS, got: {0}")]
    HttpsRequired(String),

    #[error("URL must have a host")]
    MissingHost,

    #[error("URL resolves to private/internal IP address: {0}")]
    PrivateIpDetected(IpAddr),

    #[error("Failed to resolve hostname: {0}")]
    DnsResolutionFailed(String),

    #[error("URL host is a raw IP address which is not allowed")]
    RawIpNotAllowed,
}

pub fn is_private_ipv4(ip: &Ipv4Addr) -> bool {
    if ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_unspecified()
        || ip.is_documentation()
    {
        return true;
    }
    let octets = ip.octets();
    // 100.64.0.0/10 carrier-grade NAT
    if octets[0] == 100 && (octets[1] & 0xC0) == 64 {
        return true;
    }
    // 198.18.0.0/15 benchmarking
    octets[0] == 198 && (octets[1] == 18 || octets[1] == 19)
}

pub fn is_private_ipv6(ip: &Ipv6Addr) -> bool {
    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }
    let segments = ip.segments();
    // fe80::/10 link-local
    if segments[0] & 0xFFC0 == 0xFE80 {
        return true;
    }
    // fc00::/7 unique local
    if segments[0] & 0xFE00 == 0xFC00 {
        return true;
    }
    // 2001:db8::/32 documentation
    if segments[0] == 0x2001 && segments[1] == 0x0DB8 {
        return true;
    }
    if let Some(ipv4) = ip.to_ipv4_mapped() {
        return is_private_ipv4(&ipv4);
    }
    false
}

pub fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => is_private_ipv4(ipv4),
        IpAddr::V6(ipv6) => is_private_ipv6(ipv6),
    }
}

/// Whether a redirect issued while downloading a recording may be followed.
///
/// Runs inside the HTTP client's redirect policy, which cannot resolve names, so
/// the check is syntactic: HTTPS, a DNS name rather than a raw IP, and not a
/// loopback name. Insecure mode accepts any http(s) target.
pub fn is_allowed_redirect(target: &Url, allow_insecure: bool) -> bool {
    if allow_insecure {
        return matches!(target.scheme(), "http" | "https") && target.host().is_some();
    }
    if target.scheme() != "https" {
        return false;
    }
    match target.host() {
        Some(url::Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain != "localhost" && !domain.ends_with(".localhost")
        }
        _ => false,
    }
}

/// Validate a recording URL before downloading it.
///
/// With `allow_insecure` set (local development against a mock server), plain http,
/// raw IPs and loopback hosts are accepted and no DNS lookup is made.
pub async fn validate_recording_url(
    url: &str,
    allow_insecure: bool,
) -> Result<Url, UrlValidationError> {
    let parsed = Url::parse(url)?;

    if allow_insecure {
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(UrlValidationError::HttpsRequired(
                parsed.scheme().to_string(),
            ));
        }
        if parsed.host().is_none() {
            return Err(UrlValidationError::MissingHost);
        }
        return Ok(parsed);
    }

    if parsed.scheme() != "https" {
        return Err(UrlValidationError::HttpsRequired(
            parsed.scheme().to_string(),
        ));
    }

    let host = match parsed.host() {
        Some(url::Host::Domain(domain)) => domain.to_string(),
        Some(url::Host::Ipv4(_)) | Some(url::Host::Ipv6(_)) => {
            warn!(url = %url, "Recording URL contains raw IP address");
            return Err(UrlValidationError::RawIpNotAllowed);
        }
        None => return Err(UrlValidationError::MissingHost),
    };

    let port = parsed.port().unwrap_or(443);
    let addrs: Vec<_> = tokio::net::lookup_host((host.as_str(), port))
        .await
        .map_err(|e| UrlValidationError::DnsResolutionFailed(format!("{host}: {e}")))?
        .collect();

    if addrs.is_empty() {
        return Err(UrlValidationError::DnsResolutionFailed(format!(
            "No addresses found for {host}"
        )));
    }

    for addr in addrs {
        if is_private_ip(&addr.ip()) {
            warn!(
                host = %host,
                resolved_ip = %addr.ip(),
                "Recording URL resolves to private IP address (SSRF protection)"
            );
            return Err(UrlValidationError::PrivateIpDetected(addr.ip()));
        }
    }

    Ok(parsed)
}
