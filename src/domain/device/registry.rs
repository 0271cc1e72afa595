//! Device registry with lazy liveness expiry

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// One known peer, keyed by its address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub address: IpAddr,
    pub name: String,
    pub last_active: Instant,
    /// Reserved for per-device fan-out acknowledgement. Not read by sync.
    pub delivered: bool,
}

/// Thread-safe table of peers.
///
/// Expiry is evaluated lazily: `list_active` filters and evicts stale entries
/// in the same locked pass, so there is no sweeper task contending for the
/// lock. Every method holds the lock only for an in-memory map mutation.
#[derive(Debug)]
pub struct DeviceRegistry {
    devices: Mutex<HashMap<IpAddr, Device>>,
    timeout: Duration,
}

impl DeviceRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            devices: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Liveness window
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Insert or replace the entry for `address`, marking it active now.
    pub fn add(&self, address: IpAddr, name: impl Into<String>) {
        let device = Device {
            address,
            name: name.into(),
            last_active: Instant::now(),
            delivered: false,
        };
        self.devices.lock().insert(address, device);
    }

    /// Bump `last_active` for a known device. Unknown addresses are ignored.
    pub fn update_activity(&self, address: IpAddr) {
        if let Some(device) = self.devices.lock().get_mut(&address) {
            device.last_active = Instant::now();
        }
    }

    /// Return every live device, evicting the stale ones.
    pub fn list_active(&self) -> Vec<Device> {
        let now = Instant::now();
        let timeout = self.timeout;
        let mut devices = self.devices.lock();

        devices.retain(|_, device| now.duration_since(device.last_active) <= timeout);

        let mut active: Vec<Device> = devices.values().cloned().collect();
        active.sort_by_key(|d| d.address);
        active
    }

    /// Number of live devices
    pub fn len_active(&self) -> usize {
        self.list_active().len()
    }

    pub fn clear(&self) {
        self.devices.lock().clear();
    }

    pub fn set_delivered(&self, address: IpAddr, value: bool) {
        if let Some(device) = self.devices.lock().get_mut(&address) {
            device.delivered = value;
        }
    }

    pub fn is_delivered(&self, address: IpAddr) -> bool {
        self.devices
            .lock()
            .get(&address)
            .map(|d| d.delivered)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::Arc;

    const TIMEOUT: Duration = Duration::from_secs(30);

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 168, 1, last))
    }

    #[tokio::test(start_paused = true)]
    async fn add_then_list() {
        let registry = DeviceRegistry::new(TIMEOUT);
        registry.add(ip(2), "laptop");
        registry.add(ip(3), "desktop");

        let devices = registry.list_active();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].address, ip(2));
        assert_eq!(devices[0].name, "laptop");
        assert!(!devices[0].delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn add_is_an_upsert() {
        let registry = DeviceRegistry::new(TIMEOUT);
        registry.add(ip(2), "old-name");
        registry.set_delivered(ip(2), true);
        registry.add(ip(2), "new-name");

        let devices = registry.list_active();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "new-name");
        assert!(!devices[0].delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_alive_just_before_timeout() {
        let registry = DeviceRegistry::new(TIMEOUT);
        registry.add(ip(2), "laptop");

        tokio::time::advance(TIMEOUT - Duration::from_millis(1)).await;
        assert_eq!(registry.len_active(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_just_after_timeout() {
        let registry = DeviceRegistry::new(TIMEOUT);
        registry.add(ip(2), "laptop");

        tokio::time::advance(TIMEOUT + Duration::from_millis(1)).await;
        assert!(registry.list_active().is_empty());
        // Evicted, not just hidden
        assert!(registry.devices.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn update_activity_extends_liveness() {
        let registry = DeviceRegistry::new(TIMEOUT);
        registry.add(ip(2), "laptop");

        tokio::time::advance(Duration::from_secs(20)).await;
        registry.update_activity(ip(2));
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(registry.len_active(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn update_activity_ignores_unknown() {
        let registry = DeviceRegistry::new(TIMEOUT);
        registry.update_activity(ip(9));
        assert!(registry.list_active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_removes_everything() {
        let registry = DeviceRegistry::new(TIMEOUT);
        registry.add(ip(2), "a");
        registry.add(ip(3), "b");
        registry.clear();
        assert!(registry.list_active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn delivered_flag_round_trip() {
        let registry = DeviceRegistry::new(TIMEOUT);
        registry.add(ip(2), "laptop");
        assert!(!registry.is_delivered(ip(2)));

        registry.set_delivered(ip(2), true);
        assert!(registry.is_delivered(ip(2)));

        // Absent addresses read as false and ignore writes
        registry.set_delivered(ip(7), true);
        assert!(!registry.is_delivered(ip(7)));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_registration_has_no_duplicates() {
        let registry = Arc::new(DeviceRegistry::new(TIMEOUT));
        let mut tasks = Vec::new();
        for i in 0..32u8 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                registry.add(ip(i % 4), format!("host-{}", i));
                registry.list_active().len()
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(registry.len_active(), 4);
    }
}
