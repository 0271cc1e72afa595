//! Relay infrastructure module
//!
//! HTTP server hosted by the current server-role node, and the HTTP client
//! every node uses to talk to whichever server is active.

mod client;
mod server;

use reqwest::header::HeaderName;

pub use client::HttpRelayClient;
pub use server::{AxumRelayHost, AxumServerHandle, SERVER_REQUEST_TIMEOUT, STOP_TIMEOUT};

/// Payload format, `text` or `image`
pub const DATA_TYPE: HeaderName = HeaderName::from_static("data-type");

/// `True` when the server holds a payload, `False` otherwise
pub const DATA_ATTACHED: HeaderName = HeaderName::from_static("data-attached");

/// Counter bumped on every stored payload
pub const DATA_VERSION: HeaderName = HeaderName::from_static("data-version");
