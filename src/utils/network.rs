//! Network utilities
//!
//! Host detection for the address a node advertises to callers.

use log::warn;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Fallback when no usable interface is found
pub const LOOPBACK_HOST: &str = "127.0.0.1";

/// Returns the first non-loopback IPv4 address of this machine.
///
/// Connecting a UDP socket sends nothing; it only asks the kernel which
/// local interface would route outbound traffic.
pub fn detect_local_ip() -> String {
    match outbound_ipv4() {
        Ok(Some(ip)) => ip.to_string(),
        Ok(None) => LOOPBACK_HOST.to_string(),
        Err(e) => {
            warn!("Could not determine local IP: {}", e);
            LOOPBACK_HOST.to_string()
        }
    }
}

fn outbound_ipv4() -> std::io::Result<Option<Ipv4Addr>> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect("8.8.8.8:80")?;
    match socket.local_addr()?.ip() {
        IpAddr::V4(ip) if is_advertisable(&ip) => Ok(Some(ip)),
        _ => Ok(None),
    }
}

fn is_advertisable(ip: &Ipv4Addr) -> bool {
    !ip.is_loopback() && !ip.is_unspecified()
}

/// Picks the advertised host: the configured one when present, otherwise
/// the detected one.
pub fn advertised_host(configured: Option<&str>) -> String {
    match configured {
        Some(host) if !host.trim().is_empty() => host.trim().to_string(),
        _ => detect_local_ip(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parses_as_ip(host: &str) -> bool {
        host.parse::<IpAddr>().is_ok()
    }

    #[test]
    fn test_detected_host_is_an_ip() {
        assert!(parses_as_ip(&detect_local_ip()));
    }

    #[test]
    fn test_configured_host_wins() {
        assert_eq!(advertised_host(Some(" 10.0.0.5 ")), "10.0.0.5");
        assert!(parses_as_ip(&advertised_host(Some(""))));
    }

    #[test]
    fn test_loopback_not_advertised() {
        assert!(!is_advertisable(&Ipv4Addr::LOCALHOST));
        assert!(!is_advertisable(&Ipv4Addr::UNSPECIFIED));
        assert!(is_advertisable(&Ipv4Addr::new(192, 168, 1, 20)));
    }
}
