use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::http::HeaderMap;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolves the address requests are rate-limited by.
///
/// Behind a single trusted proxy the real client is the last hop the proxy
/// appended to `X-Forwarded-For`. Without a usable header the socket peer
/// is used, and requests with neither share the unspecified address.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> IpAddr {
    let forwarded = trust_proxy
        .then(|| last_forwarded_hop(headers))
        .flatten();

    forwarded
        .or_else(|| peer.map(|addr| addr.ip()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn last_forwarded_hop(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get_all(FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .last()
        .and_then(|hop| hop.trim().parse().ok())
}
