//! Host-level facts the resolver consults: which address families are
//! configured on non-loopback interfaces.

use std::net::UdpSocket;

/// Check configured families by asking the kernel to route a datagram
/// socket toward a global address. No packet is sent; `connect` on UDP only
/// selects a source address, and fails when the family has no non-loopback
/// route.
pub fn configured_families() -> (bool, bool) {
    let v4 = UdpSocket::bind(("0.0.0.0", 0))
        .and_then(|s| s.connect(("192.0.2.1", 53)))
        .is_ok();
    let v6 = UdpSocket::bind(("::", 0))
        .and_then(|s| s.connect(("2001:db8::1", 53)))
        .is_ok();
    (v4, v6)
}
