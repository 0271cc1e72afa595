//! Node use case: election, relay hosting and clipboard sync

mod discovery;
mod sync;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::config::{DEFAULT_FAILOVER_AFTER, DEFAULT_PORT, DEFAULT_SCAN_CONCURRENCY};
use crate::domain::device::{Device, UNKNOWN_DEVICE};
use crate::domain::node::{NodeSession, Role, ServerEpoch};
use crate::domain::timing::Duration;

use super::ports::{
    ClipboardError, HostError, LocalClipboard, PeerSource, RelayClient, RelayError, RelayHost,
    ServerHandle,
};

pub use sync::SyncReport;

/// Errors from the node use case
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("No relay server known")]
    NoServer,

    #[error("Gave up on relay server {url} after {failures} failed attempts")]
    ServerLost { url: String, failures: u32 },

    #[error("Relay request failed: {0}")]
    Relay(#[from] RelayError),

    #[error("Clipboard access failed: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Relay server unavailable: {0}")]
    Host(#[from] HostError),
}

/// Configuration for a node
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Port every relay server on the subnet listens on
    pub port: u16,
    /// Name sent on registration
    pub device_name: String,
    /// Sync loop cadence
    pub tick_interval: Duration,
    /// Probes in flight during a scan
    pub scan_concurrency: usize,
    /// Re-election cadence while hosting, `None` to disable
    pub rescan_interval: Option<Duration>,
    /// Failed ticks before a client abandons its server, 0 for never
    pub failover_after: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            device_name: UNKNOWN_DEVICE.to_string(),
            tick_interval: Duration::default_tick(),
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
            rescan_interval: Some(Duration::default_rescan_interval()),
            failover_after: DEFAULT_FAILOVER_AFTER,
        }
    }
}

/// Snapshot of the node for the UI layer
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStatus {
    /// `None` while detached
    pub role: Option<Role>,
    pub server_url: Option<String>,
    pub epoch: Option<ServerEpoch>,
    pub port: u16,
    /// Live devices on our own server, 0 when not hosting
    pub active_devices: usize,
}

/// One host taking part in the shared clipboard.
///
/// All mutable role state lives in a single [`NodeSession`] behind one async
/// mutex. Lock order is session first, then the local server slot.
pub struct Node<C, R, H, P>
where
    C: LocalClipboard,
    R: RelayClient,
    H: RelayHost,
    P: PeerSource,
{
    clipboard: C,
    relay: R,
    host: H,
    peers: P,
    config: NodeConfig,
    port: AtomicU16,
    session: Mutex<NodeSession>,
    server: Mutex<Option<H::Handle>>,
    electing: AtomicBool,
}

impl<C, R, H, P> Node<C, R, H, P>
where
    C: LocalClipboard,
    R: RelayClient,
    H: RelayHost,
    P: PeerSource,
{
    /// Create a detached node. Nothing is started until [`Node::reelect`]
    /// or [`Node::run`].
    pub fn new(clipboard: C, relay: R, host: H, peers: P, config: NodeConfig) -> Self {
        Self {
            clipboard,
            relay,
            host,
            peers,
            port: AtomicU16::new(config.port),
            config,
            session: Mutex::new(NodeSession::new()),
            server: Mutex::new(None),
            electing: AtomicBool::new(false),
        }
    }

    pub fn port(&self) -> u16 {
        self.port.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Current role, server and peer count
    pub async fn status(&self) -> NodeStatus {
        let session = self.session.lock().await;
        let server = self.server.lock().await;
        NodeStatus {
            role: session.role(),
            server_url: session.server_url().map(str::to_owned),
            epoch: session.epoch(),
            port: self.port(),
            active_devices: server.as_ref().map(|s| s.active_devices().len()).unwrap_or(0),
        }
    }

    /// Devices registered with our own server
    pub async fn active_devices(&self) -> Vec<Device> {
        self.server
            .lock()
            .await
            .as_ref()
            .map(|s| s.active_devices())
            .unwrap_or_default()
    }

    /// Start a fresh local relay server and adopt it.
    ///
    /// Any server we already run is stopped first. On bind failure the node
    /// is left detached so a peer found later can still be joined.
    pub async fn host_local(&self) -> Result<(), NodeError> {
        let port = self.port();
        let url = {
            let mut session = self.session.lock().await;
            let mut server = self.server.lock().await;

            if let Some(old) = server.take() {
                old.stop().await;
            }

            let handle = match self.host.start(port).await {
                Ok(handle) => handle,
                Err(e) => {
                    warn!(error = %e, "Relay server unavailable");
                    session.detach();
                    return Err(e.into());
                }
            };

            let url = server_url(SocketAddr::new(self.peers.local_ip(), handle.port()));
            info!(%url, epoch = %handle.epoch(), "Relay server started");
            session.host(url.clone(), handle.epoch());
            *server = Some(handle);
            url
        };

        if let Err(e) = self.relay.register(&url, &self.config.device_name).await {
            warn!(%url, error = %e, "Failed to register with own relay server");
        }

        Ok(())
    }

    /// Stop our relay server, if any. Safe to call repeatedly.
    async fn stop_local(&self) {
        if let Some(handle) = self.server.lock().await.take() {
            handle.stop().await;
            info!(port = handle.port(), "Relay server stopped");
        }
    }

    /// Run an election: start a local server if we have no server at all,
    /// then scan the subnet for a senior one.
    ///
    /// A second call while one is in flight returns immediately.
    pub async fn reelect(&self) {
        let Some(_guard) = ElectionGuard::acquire(&self.electing) else {
            debug!("Election already in progress");
            return;
        };

        let detached = self.session.lock().await.role().is_none();
        if detached {
            let _ = self.host_local().await;
        }

        self.scan().await;
    }

    /// Rebind on a new port and re-run the election
    pub async fn change_port(&self, port: u16) {
        info!(port, "Changing relay port");
        self.port.store(port, Ordering::SeqCst);
        self.stop_local().await;
        self.session.lock().await.detach();
        self.reelect().await;
    }

    /// Stop the local server and forget the active one. Idempotent.
    pub async fn shutdown(&self) {
        self.stop_local().await;
        self.session.lock().await.detach();
    }

    /// Run an election in the background
    pub fn spawn_reelect(self: &Arc<Self>)
    where
        C: 'static,
        R: 'static,
        H: 'static,
        P: 'static,
    {
        let node = Arc::clone(self);
        tokio::spawn(async move { node.reelect().await });
    }

    /// Host, elect and sync until `keep_running` is cleared, then shut down.
    ///
    /// A detached node starts hosting right away; an existing role is kept.
    /// The flag is checked once per tick.
    pub async fn run(self: Arc<Self>, keep_running: Arc<AtomicBool>)
    where
        C: 'static,
        R: 'static,
        H: 'static,
        P: 'static,
    {
        let detached = self.session.lock().await.role().is_none();
        if detached {
            let _ = self.host_local().await;
        }
        self.spawn_reelect();

        let mut ticker = tokio::time::interval(self.config.tick_interval.as_std());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_election = Instant::now();

        while keep_running.load(Ordering::SeqCst) {
            ticker.tick().await;
            if !keep_running.load(Ordering::SeqCst) {
                break;
            }

            match self.sync_once().await {
                Ok(report) if report.pulled || report.pushed => {
                    debug!(pulled = report.pulled, pushed = report.pushed, "Synced");
                }
                Ok(_) => {}
                Err(NodeError::NoServer) => {
                    self.spawn_reelect();
                }
                Err(e @ NodeError::ServerLost { .. }) => {
                    warn!(error = %e, "Rediscovering");
                    self.spawn_reelect();
                }
                Err(e) => {
                    debug!(error = %e, "Sync tick failed");
                }
            }

            if let Some(interval) = self.config.rescan_interval {
                if last_election.elapsed() >= interval.as_std() {
                    last_election = Instant::now();
                    if self.session.lock().await.is_hosting() {
                        self.spawn_reelect();
                    }
                }
            }
        }

        self.shutdown().await;
    }
}

/// Base URL of a relay server
pub fn server_url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

/// Clears the election flag when dropped
struct ElectionGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ElectionGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self { flag })
        }
    }
}

impl Drop for ElectionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
