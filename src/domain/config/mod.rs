//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, DEFAULT_FAILOVER_AFTER, DEFAULT_MAX_PAYLOAD, DEFAULT_PORT,
    DEFAULT_SCAN_CONCURRENCY, RESCAN_OFF,
};
