//! Host identity: address and device name

use std::net::{IpAddr, Ipv4Addr};

use tracing::warn;

use crate::domain::device::{sanitize_device_name, UNKNOWN_DEVICE};

/// First non-loopback IPv4 address, falling back to 127.0.0.1
pub fn detect_local_ip() -> IpAddr {
    match local_ip_address::local_ip() {
        Ok(ip) => ip,
        Err(e) => {
            warn!(error = %e, "Could not determine local IP address, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

/// Sanitized hostname used when no device name is configured
pub fn default_device_name() -> String {
    gethostname::gethostname()
        .to_str()
        .map(sanitize_device_name)
        .unwrap_or_else(|| UNKNOWN_DEVICE.to_string())
}
