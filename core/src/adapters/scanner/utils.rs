use std::net::IpAddr;

/// Split an `address:port` string as printed by `lsof`.
///
/// Handles:
/// - IPv4: "127.0.0.1:3000" or "*:8080"
/// - IPv6: "\[::1]:3000" or "\[fe80::1]:8080"
///
/// The port is the text after the last colon. Port 0 is rejected.
pub(super) fn parse_address(address: &str) -> Option<(String, u16)> {
    let (addr, port_str) = if address.starts_with('[') {
        let bracket_end = address.find(']')?;
        let port_str = address[bracket_end + 1..].strip_prefix(':')?;
        (&address[..=bracket_end], port_str)
    } else {
        let last_colon = address.rfind(':')?;
        (&address[..last_colon], &address[last_colon + 1..])
    };

    let port: u16 = port_str.parse().ok()?;
    if port == 0 {
        return None;
    }

    let addr = if addr.is_empty() { "*" } else { addr };
    Some((addr.to_string(), port))
}

/// Render a decoded kernel address the way `lsof` prints it.
pub(super) fn display_ip(ip: IpAddr) -> String {
    if ip.is_unspecified() {
        return "*".to_string();
    }
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{}]", v6),
    }
}
