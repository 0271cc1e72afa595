//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod clipboard;
pub mod config;
pub mod device;
pub mod error;
pub mod node;
pub mod timing;

// Re-export common types
pub use clipboard::{ClipboardFormat, Payload};
pub use config::AppConfig;
pub use device::{sanitize_device_name, Device, DeviceRegistry};
pub use error::*;
pub use node::{InvalidRoleTransition, Link, NodeSession, Role, ServerEpoch};
pub use timing::Duration;
