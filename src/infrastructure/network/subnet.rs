//! Peer candidate sources

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::application::ports::PeerSource;

/// Every other host of this machine's IPv4 /24
pub struct SubnetPeers {
    local_ip: IpAddr,
}

impl SubnetPeers {
    pub fn new(local_ip: IpAddr) -> Self {
        Self { local_ip }
    }
}

impl PeerSource for SubnetPeers {
    fn local_ip(&self) -> IpAddr {
        self.local_ip
    }

    /// Hosts .1 through .254 of the /24, skipping ourselves.
    /// Loopback and IPv6 addresses have no subnet to scan.
    fn candidates(&self, port: u16) -> Vec<SocketAddr> {
        let IpAddr::V4(own) = self.local_ip else {
            return Vec::new();
        };
        if own.is_loopback() {
            return Vec::new();
        }

        let [a, b, c, me] = own.octets();
        (1..=254u8)
            .filter(|host| *host != me)
            .map(|host| SocketAddr::new(IpAddr::V4(Ipv4Addr::new(a, b, c, host)), port))
            .collect()
    }
}

/// Fixed candidate list, for hosts that cannot be found by a subnet sweep
pub struct StaticPeers {
    local_ip: IpAddr,
    peers: Vec<SocketAddr>,
}

impl StaticPeers {
    pub fn new(local_ip: IpAddr, peers: Vec<SocketAddr>) -> Self {
        Self { local_ip, peers }
    }
}

impl PeerSource for StaticPeers {
    fn local_ip(&self) -> IpAddr {
        self.local_ip
    }

    /// The configured peers, regardless of `port`
    fn candidates(&self, _port: u16) -> Vec<SocketAddr> {
        self.peers.clone()
    }
}
