//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the OS clipboard, HTTP and the local network.

pub mod clipboard;
pub mod config;
pub mod network;
pub mod relay;

// Re-export adapters
pub use clipboard::{create_clipboard, ArboardClipboard, ClipboardBackend, MemoryClipboard, WaylandClipboard};
pub use config::XdgConfigStore;
pub use network::{default_device_name, detect_local_ip, StaticPeers, SubnetPeers};
pub use relay::{AxumRelayHost, AxumServerHandle, HttpRelayClient};
