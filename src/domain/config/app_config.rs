//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::timing::Duration;

/// Port shared by every relay server on the subnet
pub const DEFAULT_PORT: u16 = 5000;

/// Probes in flight during a subnet scan
pub const DEFAULT_SCAN_CONCURRENCY: usize = 16;

/// Failed ticks a client tolerates before abandoning its server
pub const DEFAULT_FAILOVER_AFTER: u32 = 20;

/// Request body limit of the relay server (64 MiB)
pub const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024 * 1024;

/// Value of `rescan_interval` that disables periodic re-election
pub const RESCAN_OFF: &str = "off";

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub port: Option<u16>,
    pub device_name: Option<String>,
    pub clipboard_backend: Option<String>,
    pub tick_interval: Option<String>,
    pub request_timeout: Option<String>,
    pub probe_timeout: Option<String>,
    pub scan_concurrency: Option<usize>,
    pub device_timeout: Option<String>,
    pub rescan_interval: Option<String>,
    pub failover_after: Option<u32>,
    pub max_payload: Option<usize>,
}

impl AppConfig {
    /// Create config with default values.
    /// `device_name` stays unset so the hostname is used.
    pub fn defaults() -> Self {
        Self {
            port: Some(DEFAULT_PORT),
            device_name: None,
            clipboard_backend: Some("arboard".to_string()),
            tick_interval: Some("300ms".to_string()),
            request_timeout: Some("3s".to_string()),
            probe_timeout: Some("2s".to_string()),
            scan_concurrency: Some(DEFAULT_SCAN_CONCURRENCY),
            device_timeout: Some("30s".to_string()),
            rescan_interval: Some("60s".to_string()),
            failover_after: Some(DEFAULT_FAILOVER_AFTER),
            max_payload: Some(DEFAULT_MAX_PAYLOAD),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            port: other.port.or(self.port),
            device_name: other.device_name.or(self.device_name),
            clipboard_backend: other.clipboard_backend.or(self.clipboard_backend),
            tick_interval: other.tick_interval.or(self.tick_interval),
            request_timeout: other.request_timeout.or(self.request_timeout),
            probe_timeout: other.probe_timeout.or(self.probe_timeout),
            scan_concurrency: other.scan_concurrency.or(self.scan_concurrency),
            device_timeout: other.device_timeout.or(self.device_timeout),
            rescan_interval: other.rescan_interval.or(self.rescan_interval),
            failover_after: other.failover_after.or(self.failover_after),
            max_payload: other.max_payload.or(self.max_payload),
        }
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Get clipboard backend, or "arboard" if not set
    pub fn clipboard_backend_or_default(&self) -> &str {
        self.clipboard_backend.as_deref().unwrap_or("arboard")
    }

    pub fn tick_interval_or_default(&self) -> Duration {
        parse_or(&self.tick_interval, Duration::default_tick)
    }

    pub fn request_timeout_or_default(&self) -> Duration {
        parse_or(&self.request_timeout, Duration::default_request_timeout)
    }

    pub fn probe_timeout_or_default(&self) -> Duration {
        parse_or(&self.probe_timeout, Duration::default_probe_timeout)
    }

    pub fn device_timeout_or_default(&self) -> Duration {
        parse_or(&self.device_timeout, Duration::default_device_timeout)
    }

    /// Get rescan interval, `None` when periodic re-election is off
    pub fn rescan_interval_or_default(&self) -> Option<Duration> {
        match self.rescan_interval.as_deref().map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case(RESCAN_OFF) => None,
            _ => Some(parse_or(
                &self.rescan_interval,
                Duration::default_rescan_interval,
            )),
        }
    }

    /// Get scan concurrency, never below one
    pub fn scan_concurrency_or_default(&self) -> usize {
        self.scan_concurrency
            .unwrap_or(DEFAULT_SCAN_CONCURRENCY)
            .max(1)
    }

    /// Get failover threshold, 0 meaning never
    pub fn failover_after_or_default(&self) -> u32 {
        self.failover_after.unwrap_or(DEFAULT_FAILOVER_AFTER)
    }

    pub fn max_payload_or_default(&self) -> usize {
        self.max_payload.unwrap_or(DEFAULT_MAX_PAYLOAD)
    }
}

fn parse_or(value: &Option<String>, default: fn() -> Duration) -> Duration {
    value
        .as_ref()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(default)
}
