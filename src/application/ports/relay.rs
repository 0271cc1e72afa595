//! Relay client port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::clipboard::Payload;
use crate::domain::node::ServerEpoch;

/// Relay client errors
#[derive(Debug, Clone, Error)]
pub enum RelayError {
    /// Connection refused, timed out or no route to host
    #[error("Relay server unreachable: {0}")]
    Unreachable(String),

    /// The server answered with something that does not follow the protocol
    #[error("Relay protocol violation: {0}")]
    Protocol(String),

    #[error("Relay server rejected request with status {0}")]
    Rejected(u16),
}

/// Answer to `HEAD /clipboard`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipboardState {
    pub attached: bool,
    /// Payload version, when the server reports one
    pub version: Option<u64>,
}

/// Answer to `GET /clipboard`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedPayload {
    pub payload: Payload,
    pub version: Option<u64>,
}

/// Port for talking to a relay server, local or remote.
///
/// `server` is a base URL such as `http://192.168.1.4:5000`.
#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Announce this host under `name`
    async fn register(&self, server: &str, name: &str) -> Result<(), RelayError>;

    /// Ask a server for its epoch. Uses the short probe timeout.
    async fn timestamp(&self, server: &str) -> Result<ServerEpoch, RelayError>;

    /// Check whether the server holds a payload, without downloading it
    async fn probe(&self, server: &str) -> Result<ClipboardState, RelayError>;

    /// Download the stored payload
    async fn fetch(&self, server: &str) -> Result<VersionedPayload, RelayError>;

    /// Upload a payload, returning the version the server assigned
    async fn push(&self, server: &str, payload: &Payload) -> Result<Option<u64>, RelayError>;
}
