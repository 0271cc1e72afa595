//! Config resolution and shared exit codes

use std::env;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::device::sanitize_device_name;
use crate::domain::timing::Duration;
use crate::infrastructure::{default_device_name, ClipboardBackend, XdgConfigStore};

use super::args::{Cli, NodeOptions};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable overriding the relay port
pub const PORT_ENV: &str = "COMMON_CLIPBOARD_PORT";

/// Config layer built from command-line flags
pub fn cli_config(cli: &Cli) -> AppConfig {
    AppConfig {
        port: cli.port,
        device_name: cli.name.clone(),
        clipboard_backend: cli.backend.clone(),
        ..Default::default()
    }
}

/// Config layer built from the environment. Unparsable values are ignored.
pub fn env_config() -> AppConfig {
    AppConfig {
        port: env::var(PORT_ENV).ok().and_then(|s| s.trim().parse().ok()),
        ..Default::default()
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %store.path().display(), error = %e, "Ignoring config file");
            AppConfig::empty()
        }
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config())
        .merge(cli_config)
}

/// Validate a merged config into node options.
///
/// Unlike the `*_or_default` accessors, a malformed value is an error here so
/// that typos surface before the node starts.
pub fn resolve_options(config: &AppConfig) -> Result<NodeOptions, String> {
    let backend = config
        .clipboard_backend_or_default()
        .parse::<ClipboardBackend>()
        .map_err(|e| e.to_string())?;

    let rescan_interval = match config.rescan_interval.as_deref() {
        Some(value) => {
            parse_rescan(value).map_err(|e| format!("Invalid rescan_interval: {}", e))?
        }
        None => config.rescan_interval_or_default(),
    };

    let device_name = match config.device_name.as_deref() {
        Some(name) => sanitize_device_name(name),
        None => default_device_name(),
    };

    Ok(NodeOptions {
        port: config.port_or_default(),
        device_name,
        backend,
        tick_interval: parse_duration("tick_interval", &config.tick_interval)?
            .unwrap_or_else(Duration::default_tick),
        request_timeout: parse_duration("request_timeout", &config.request_timeout)?
            .unwrap_or_else(Duration::default_request_timeout),
        probe_timeout: parse_duration("probe_timeout", &config.probe_timeout)?
            .unwrap_or_else(Duration::default_probe_timeout),
        scan_concurrency: config.scan_concurrency_or_default(),
        device_timeout: parse_duration("device_timeout", &config.device_timeout)?
            .unwrap_or_else(Duration::default_device_timeout),
        rescan_interval,
        failover_after: config.failover_after_or_default(),
        max_payload: config.max_payload_or_default(),
    })
}

fn parse_duration(key: &str, value: &Option<String>) -> Result<Option<Duration>, String> {
    value
        .as_deref()
        .map(|s| s.parse::<Duration>())
        .transpose()
        .map_err(|e| format!("Invalid {}: {}", key, e))
}

/// `off` disables periodic re-election
pub fn parse_rescan(value: &str) -> Result<Option<Duration>, String> {
    if value.trim().eq_ignore_ascii_case(crate::domain::config::RESCAN_OFF) {
        return Ok(None);
    }
    value.parse::<Duration>().map(Some).map_err(|e| e.to_string())
}
