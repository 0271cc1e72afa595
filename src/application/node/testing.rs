//! In-memory LAN used by the node unit tests

use std::collections::HashMap;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{server_url, Node, NodeConfig};
use crate::application::ports::{
    ClipboardError, ClipboardState, HostError, LocalClipboard, PeerSource, RelayClient,
    RelayError, RelayHost, ServerHandle, VersionedPayload,
};
use crate::domain::clipboard::Payload;
use crate::domain::device::{Device, DeviceRegistry};
use crate::domain::node::ServerEpoch;
use crate::domain::timing::Duration;

pub const PORT: u16 = 5000;
pub const FAILOVER_AFTER: u32 = 3;

pub type TestNode = Node<MockClipboard, MockRelay, MockHost, MockPeers>;

struct MockServer {
    epoch: ServerEpoch,
    payload: Option<Payload>,
    version: u64,
    registry: Arc<DeviceRegistry>,
    refuse_register: bool,
    reject_pushes: Option<u16>,
    unreachable: bool,
}

/// Relay servers reachable by URL, shared by every test node
#[derive(Default)]
pub struct Lan {
    servers: Mutex<HashMap<String, MockServer>>,
    pushes: AtomicUsize,
    fetches: AtomicUsize,
}

impl Lan {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_hosted(&self, url: &str) -> bool {
        self.servers.lock().unwrap().contains_key(url)
    }

    pub fn stored(&self, url: &str) -> Option<Payload> {
        self.servers
            .lock()
            .unwrap()
            .get(url)
            .and_then(|s| s.payload.clone())
    }

    /// Simulate a push from a host outside the test
    pub fn store(&self, url: &str, payload: Payload) {
        let mut servers = self.servers.lock().unwrap();
        let server = servers.get_mut(url).unwrap();
        server.payload = Some(payload);
        server.version += 1;
    }

    pub fn refuse_registrations(&self, url: &str) {
        self.servers.lock().unwrap().get_mut(url).unwrap().refuse_register = true;
    }

    /// Answer every push with `status`; attempts are still counted
    pub fn reject_pushes(&self, url: &str, status: u16) {
        self.servers.lock().unwrap().get_mut(url).unwrap().reject_pushes = Some(status);
    }

    pub fn make_unreachable(&self, url: &str) {
        self.servers.lock().unwrap().get_mut(url).unwrap().unreachable = true;
    }

    /// Simulate a server stopped behind its owner's back
    pub fn kill(&self, url: &str) {
        self.servers.lock().unwrap().remove(url);
    }

    pub fn push_count(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn with_server<T>(
        &self,
        url: &str,
        f: impl FnOnce(&mut MockServer) -> Result<T, RelayError>,
    ) -> Result<T, RelayError> {
        let mut servers = self.servers.lock().unwrap();
        match servers.get_mut(url) {
            Some(server) if !server.unreachable => f(server),
            _ => Err(RelayError::Unreachable(format!("connection refused: {}", url))),
        }
    }
}

#[derive(Clone, Default)]
pub struct MockClipboard {
    content: Arc<Mutex<Option<Payload>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MockClipboard {
    pub fn set(&self, payload: Payload) {
        *self.content.lock().unwrap() = Some(payload);
    }

    pub fn get(&self) -> Option<Payload> {
        self.content.lock().unwrap().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl LocalClipboard for MockClipboard {
    async fn read(&self) -> Result<Option<Payload>, ClipboardError> {
        Ok(self.get())
    }

    async fn write(&self, payload: &Payload) -> Result<(), ClipboardError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClipboardError::WriteFailed("clipboard locked".to_string()));
        }
        self.set(payload.clone());
        Ok(())
    }
}

pub struct MockRelay {
    lan: Arc<Lan>,
    ip: IpAddr,
}

#[async_trait]
impl RelayClient for MockRelay {
    async fn register(&self, server: &str, name: &str) -> Result<(), RelayError> {
        self.lan.with_server(server, |s| {
            if s.refuse_register {
                return Err(RelayError::Rejected(500));
            }
            s.registry.add(self.ip, name);
            Ok(())
        })
    }

    async fn timestamp(&self, server: &str) -> Result<ServerEpoch, RelayError> {
        self.lan.with_server(server, |s| Ok(s.epoch))
    }

    async fn probe(&self, server: &str) -> Result<ClipboardState, RelayError> {
        self.lan.with_server(server, |s| {
            Ok(ClipboardState {
                attached: s.payload.is_some(),
                version: s.payload.as_ref().map(|_| s.version),
            })
        })
    }

    async fn fetch(&self, server: &str) -> Result<VersionedPayload, RelayError> {
        self.lan.fetches.fetch_add(1, Ordering::SeqCst);
        self.lan.with_server(server, |s| match &s.payload {
            Some(payload) => Ok(VersionedPayload {
                payload: payload.clone(),
                version: Some(s.version),
            }),
            None => Err(RelayError::Rejected(404)),
        })
    }

    async fn push(&self, server: &str, payload: &Payload) -> Result<Option<u64>, RelayError> {
        self.lan.with_server(server, |s| {
            self.lan.pushes.fetch_add(1, Ordering::SeqCst);
            if let Some(status) = s.reject_pushes {
                return Err(RelayError::Rejected(status));
            }
            s.payload = Some(payload.clone());
            s.version += 1;
            Ok(Some(s.version))
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum HostBehaviour {
    Normal,
    FailBind,
}

pub struct MockHost {
    lan: Arc<Lan>,
    ip: IpAddr,
    behaviour: HostBehaviour,
}

pub struct MockHandle {
    lan: Arc<Lan>,
    url: String,
    epoch: ServerEpoch,
    port: u16,
    registry: Arc<DeviceRegistry>,
}

#[async_trait]
impl RelayHost for MockHost {
    type Handle = MockHandle;

    async fn start(&self, port: u16) -> Result<MockHandle, HostError> {
        let url = server_url(SocketAddr::new(self.ip, port));
        let mut servers = self.lan.servers.lock().unwrap();
        if self.behaviour == HostBehaviour::FailBind || servers.contains_key(&url) {
            return Err(HostError::BindFailed {
                port,
                message: "address in use".to_string(),
            });
        }

        let epoch = ServerEpoch::now();
        let registry = Arc::new(DeviceRegistry::new(std::time::Duration::from_secs(30)));
        servers.insert(
            url.clone(),
            MockServer {
                epoch,
                payload: None,
                version: 0,
                registry: Arc::clone(&registry),
                refuse_register: false,
                reject_pushes: None,
                unreachable: false,
            },
        );

        Ok(MockHandle {
            lan: Arc::clone(&self.lan),
            url,
            epoch,
            port,
            registry,
        })
    }
}

#[async_trait]
impl ServerHandle for MockHandle {
    fn epoch(&self) -> ServerEpoch {
        self.epoch
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn active_devices(&self) -> Vec<Device> {
        self.registry.list_active()
    }

    fn is_running(&self) -> bool {
        self.lan.servers.lock().unwrap().get(&self.url).map(|s| s.epoch) == Some(self.epoch)
    }

    async fn stop(&self) {
        let mut servers = self.lan.servers.lock().unwrap();
        if servers.get(&self.url).map(|s| s.epoch) == Some(self.epoch) {
            servers.remove(&self.url);
        }
        self.registry.clear();
    }
}

pub struct MockPeers {
    ip: IpAddr,
    others: Vec<IpAddr>,
}

impl PeerSource for MockPeers {
    fn local_ip(&self) -> IpAddr {
        self.ip
    }

    fn candidates(&self, port: u16) -> Vec<SocketAddr> {
        self.others
            .iter()
            .map(|ip| SocketAddr::new(*ip, port))
            .collect()
    }
}

fn lan_ip(last: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
}

pub fn test_node(lan: &Arc<Lan>, last: u8, others: &[u8]) -> (Arc<TestNode>, MockClipboard) {
    test_node_with(lan, last, others, HostBehaviour::Normal)
}

pub fn test_node_with(
    lan: &Arc<Lan>,
    last: u8,
    others: &[u8],
    behaviour: HostBehaviour,
) -> (Arc<TestNode>, MockClipboard) {
    let ip = lan_ip(last);
    let clipboard = MockClipboard::default();
    let config = NodeConfig {
        port: PORT,
        device_name: format!("node-{}", last),
        tick_interval: Duration::from_millis(20),
        scan_concurrency: 4,
        rescan_interval: None,
        failover_after: FAILOVER_AFTER,
    };

    let node = Node::new(
        clipboard.clone(),
        MockRelay {
            lan: Arc::clone(lan),
            ip,
        },
        MockHost {
            lan: Arc::clone(lan),
            ip,
            behaviour,
        },
        MockPeers {
            ip,
            others: others.iter().map(|o| lan_ip(*o)).collect(),
        },
        config,
    );

    (Arc::new(node), clipboard)
}

/// Poll `check` until it holds, failing the test after five seconds
pub async fn wait_for<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    while !check().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}
