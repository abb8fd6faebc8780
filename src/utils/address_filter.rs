//! Private and local address classification used as an SSRF guard.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Returns `true` when `ip` must not be the target of an outbound request.
///
/// Blocks:
/// - Loopback (127.0.0.0/8, ::1)
/// - Private networks (10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16)
/// - Link-local (169.254.0.0/16, fe80::/10), which includes cloud metadata endpoints
/// - Unspecified addresses (0.0.0.0, ::)
/// - IPv6 unique-local (fc00::/7)
/// - IPv4-mapped IPv6 addresses wrapping any of the above
pub fn is_private_address(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => is_private_v6(v6),
    }
}

fn is_private_v4(v4: Ipv4Addr) -> bool {
    v4.is_loopback() || v4.is_private() || v4.is_link_local() || v4.is_unspecified()
}

fn is_private_v6(v6: Ipv6Addr) -> bool {
    if v6.is_loopback() || v6.is_unspecified() {
        return true;
    }

    if let Some(v4) = v6.to_ipv4_mapped() {
        return is_private_v4(v4);
    }

    let first = v6.segments()[0];
    // fe80::/10
    if first & 0xffc0 == 0xfe80 {
        return true;
    }
    // fc00::/7
    first & 0xfe00 == 0xfc00
}

/// Returns the first private address of `addresses`, if any.
pub fn first_private(addresses: &[IpAddr]) -> Option<IpAddr> {
    addresses.iter().copied().find(|ip| is_private_address(*ip))
}
