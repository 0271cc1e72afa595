//! Network infrastructure module
//!
//! Local address detection and the peer candidates probed during elections.

mod identity;
mod subnet;

pub use identity::{default_device_name, detect_local_ip};
pub use subnet::{StaticPeers, SubnetPeers};
