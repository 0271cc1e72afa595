//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod clipboard;
pub mod config;
pub mod host;
pub mod network;
pub mod relay;

// Re-export common types
pub use clipboard::{ClipboardError, LocalClipboard};
pub use config::ConfigStore;
pub use host::{HostError, RelayHost, ServerHandle};
pub use network::PeerSource;
pub use relay::{ClipboardState, RelayClient, RelayError, VersionedPayload};
