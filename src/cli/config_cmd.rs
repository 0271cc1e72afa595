//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::timing::Duration;
use crate::infrastructure::ClipboardBackend;

use super::app::parse_rescan;
use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    store
        .update(|config| set_value(config, key, value))
        .await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    presenter.output(get_value(&config, key).as_deref().unwrap_or(NOT_SET));

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, get_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

/// Validate `value` for `key` and store it in `config`
fn set_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "port" => {
            let port = value
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| invalid("Value must be a port between 1 and 65535".to_string()))?;
            config.port = Some(port);
        }
        "device_name" => {
            if value.trim().is_empty() {
                return Err(invalid("Value must not be empty".to_string()));
            }
            config.device_name = Some(value.to_string());
        }
        "clipboard_backend" => {
            let backend = value
                .parse::<ClipboardBackend>()
                .map_err(|e| invalid(e.to_string()))?;
            config.clipboard_backend = Some(backend.to_string());
        }
        "tick_interval" | "request_timeout" | "probe_timeout" | "device_timeout" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(e.to_string()))?;
            let slot = match key {
                "tick_interval" => &mut config.tick_interval,
                "request_timeout" => &mut config.request_timeout,
                "probe_timeout" => &mut config.probe_timeout,
                _ => &mut config.device_timeout,
            };
            *slot = Some(value.trim().to_string());
        }
        "rescan_interval" => {
            parse_rescan(value).map_err(invalid)?;
            config.rescan_interval = Some(value.trim().to_string());
        }
        "scan_concurrency" => {
            let n = value
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("Value must be a positive integer".to_string()))?;
            config.scan_concurrency = Some(n);
        }
        "failover_after" => {
            let n = value
                .parse::<u32>()
                .map_err(|_| invalid("Value must be a non-negative integer".to_string()))?;
            config.failover_after = Some(n);
        }
        "max_payload" => {
            let n = value
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("Value must be a positive number of bytes".to_string()))?;
            config.max_payload = Some(n);
        }
        _ => return Err(invalid("Unknown key".to_string())),
    }

    Ok(())
}

fn get_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "port" => config.port.map(|p| p.to_string()),
        "device_name" => config.device_name.clone(),
        "clipboard_backend" => config.clipboard_backend.clone(),
        "tick_interval" => config.tick_interval.clone(),
        "request_timeout" => config.request_timeout.clone(),
        "probe_timeout" => config.probe_timeout.clone(),
        "scan_concurrency" => config.scan_concurrency.map(|n| n.to_string()),
        "device_timeout" => config.device_timeout.clone(),
        "rescan_interval" => config.rescan_interval.clone(),
        "failover_after" => config.failover_after.map(|n| n.to_string()),
        "max_payload" => config.max_payload.map(|n| n.to_string()),
        _ => None,
    }
}
