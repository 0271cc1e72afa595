//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod node;
pub mod ports;

// Re-export use cases
pub use node::{server_url, Node, NodeConfig, NodeError, NodeStatus, SyncReport};
