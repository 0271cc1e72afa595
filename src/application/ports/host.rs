//! Relay host port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::device::Device;
use crate::domain::node::ServerEpoch;

/// Relay host errors
#[derive(Debug, Clone, Error)]
pub enum HostError {
    #[error("Failed to bind relay server on port {port}: {message}")]
    BindFailed { port: u16, message: String },
}

/// A running relay server owned by this process
#[async_trait]
pub trait ServerHandle: Send + Sync {
    /// Instant the server started
    fn epoch(&self) -> ServerEpoch;

    /// Port actually bound
    fn port(&self) -> u16;

    /// Devices registered with this server and still live
    fn active_devices(&self) -> Vec<Device>;

    /// False once the server task has ended, whoever stopped it
    fn is_running(&self) -> bool;

    /// Signal shutdown and wait (bounded) for the server task.
    /// Calling it again is a no-op.
    async fn stop(&self);
}

/// Port for starting the in-process relay server
#[async_trait]
pub trait RelayHost: Send + Sync {
    type Handle: ServerHandle + 'static;

    /// Bind and start serving on `port`
    async fn start(&self, port: u16) -> Result<Self::Handle, HostError>;
}
