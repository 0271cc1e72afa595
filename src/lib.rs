//! Common Clipboard - one clipboard shared by every host on the LAN
//!
//! Each host runs a node. Nodes elect the longest-running relay server on the
//! subnet, every other node becomes its client, and a sync loop keeps the
//! local clipboard and the relay in step.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Payloads, device registry, server epochs, node session state
//! - **Application**: The node use case (election and sync) and its port traits
//! - **Infrastructure**: Adapters (axum relay server, reqwest client, OS clipboards)
//! - **CLI**: Argument parsing, config, signals and the local control channel

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
