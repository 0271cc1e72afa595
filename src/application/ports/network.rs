//! Peer discovery port interface

use std::net::{IpAddr, SocketAddr};

/// Port describing where this host lives and which peers to probe
pub trait PeerSource: Send + Sync {
    /// Address other hosts reach this one on
    fn local_ip(&self) -> IpAddr;

    /// Relay server addresses worth probing, never including this host
    fn candidates(&self, port: u16) -> Vec<SocketAddr>;
}
