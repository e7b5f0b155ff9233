//! Caller identity resolution.
//!
//! # Responsibilities
//! - Decide which address identifies the caller
//! - Honor the forwarded header only when the peer is a trusted proxy
//! - Attach the resolved [`ClientIp`] to the request for later stages
//!
//! # Design Decisions
//! - Untrusted peers can never choose their own rate-limit key
//! - The client-most entry of the forwarded header is used
//! - A malformed header falls back to the peer address

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderName, Request},
    middleware::Next,
    response::Response,
};
use ipnet::IpNet;

use crate::config::ProxyConfig;

/// Resolved caller address, stored in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientIp(pub IpAddr);

impl ClientIp {
    /// Key used by per-caller state such as rate buckets.
    pub fn key(&self) -> String {
        self.0.to_string()
    }
}

impl std::fmt::Display for ClientIp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Parse a CIDR range, accepting a bare address as a single-host range.
pub fn parse_range(s: &str) -> Option<IpNet> {
    let s = s.trim();
    s.parse::<IpNet>()
        .ok()
        .or_else(|| s.parse::<IpAddr>().ok().map(IpNet::from))
}

/// Set of trusted intermediaries and the header they forward.
#[derive(Debug, Clone)]
pub struct TrustedProxies {
    ranges: Vec<IpNet>,
    header: HeaderName,
}

impl TrustedProxies {
    pub fn new(ranges: Vec<IpNet>, header: HeaderName) -> Self {
        Self { ranges, header }
    }

    /// Build from config. Unparseable ranges are skipped with a warning;
    /// validation rejects them before this point in normal startup.
    pub fn from_config(config: &ProxyConfig) -> Self {
        let ranges = config
            .trusted_ranges
            .iter()
            .filter_map(|s| {
                let parsed = parse_range(s);
                if parsed.is_none() {
                    tracing::warn!(range = %s, "Ignoring invalid trusted range");
                }
                parsed
            })
            .collect();

        let header = HeaderName::from_bytes(config.forwarded_header.trim().as_bytes())
            .unwrap_or_else(|_| HeaderName::from_static("x-forwarded-for"));

        Self::new(ranges, header)
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    pub fn is_trusted(&self, ip: &IpAddr) -> bool {
        let ip = ip.to_canonical();
        self.ranges.iter().any(|range| range.contains(&ip))
    }

    /// Resolve the caller address from the peer and an optional forwarded value.
    /// IPv4-mapped IPv6 addresses come back as plain IPv4.
    pub fn resolve(&self, peer: IpAddr, forwarded: Option<&str>) -> IpAddr {
        let peer = peer.to_canonical();
        if !self.is_trusted(&peer) {
            return peer;
        }

        forwarded
            .and_then(|value| value.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok())
            .map(|ip| ip.to_canonical())
            .unwrap_or(peer)
    }
}

/// Middleware resolving the caller identity for every request.
pub async fn resolve_client_middleware(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(proxies): State<Arc<TrustedProxies>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let forwarded = request
        .headers()
        .get(proxies.header())
        .and_then(|v| v.to_str().ok());

    let client = ClientIp(proxies.resolve(peer.ip(), forwarded));
    request.extensions_mut().insert(client);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxies(ranges: &[&str]) -> TrustedProxies {
        TrustedProxies::new(
            ranges.iter().filter_map(|r| parse_range(r)).collect(),
            HeaderName::from_static("x-forwarded-for"),
        )
    }

    #[test]
    fn untrusted_peer_header_is_ignored() {
        let p = proxies(&["10.50.0.0/24"]);
        let peer: IpAddr = "203.0.113.9".parse().unwrap();
        assert_eq!(p.resolve(peer, Some("1.2.3.4")), peer);
    }

    #[test]
    fn trusted_peer_uses_header() {
        let p = proxies(&["10.50.0.0/24"]);
        let peer: IpAddr = "10.50.0.7".parse().unwrap();
        let resolved = p.resolve(peer, Some("198.51.100.4, 10.50.0.2"));
        assert_eq!(resolved, "198.51.100.4".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn trusted_peer_without_header_uses_peer() {
        let p = proxies(&["10.50.0.0/24"]);
        let peer: IpAddr = "10.50.0.7".parse().unwrap();
        assert_eq!(p.resolve(peer, None), peer);
    }

    #[test]
    fn malformed_header_falls_back_to_peer() {
        let p = proxies(&["10.50.0.0/24"]);
        let peer: IpAddr = "10.50.0.7".parse().unwrap();
        assert_eq!(p.resolve(peer, Some("definitely not an ip")), peer);
        assert_eq!(p.resolve(peer, Some("")), peer);
    }

    #[test]
    fn bare_address_range_and_mapped_ipv4() {
        let p = proxies(&["127.0.0.1"]);
        let mapped: IpAddr = "::ffff:127.0.0.1".parse().unwrap();
        assert!(p.is_trusted(&mapped));
        assert!(!p.is_trusted(&"127.0.0.2".parse().unwrap()));
    }

    #[test]
    fn mapped_and_plain_ipv4_share_one_key() {
        let p = proxies(&["10.50.0.0/24"]);
        let plain: IpAddr = "203.0.113.9".parse().unwrap();
        let mapped: IpAddr = "::ffff:203.0.113.9".parse().unwrap();
        assert_eq!(p.resolve(mapped, None), plain);
        assert_eq!(
            ClientIp(p.resolve(mapped, None)).key(),
            ClientIp(p.resolve(plain, None)).key()
        );

        let proxy: IpAddr = "::ffff:10.50.0.7".parse().unwrap();
        assert_eq!(p.resolve(proxy, Some("::ffff:198.51.100.4")), "198.51.100.4".parse::<IpAddr>().unwrap());
        assert_eq!(p.resolve(proxy, None), "10.50.0.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn no_ranges_trusts_nobody() {
        let p = proxies(&[]);
        let peer: IpAddr = "10.50.0.7".parse().unwrap();
        assert_eq!(p.resolve(peer, Some("1.1.1.1")), peer);
    }
}
