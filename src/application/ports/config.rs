//! Preferences storage port

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Persisted preferences. The node itself never writes them.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read the stored config. A missing file yields [`AppConfig::empty`].
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Write `config`, creating parent directories as needed
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    fn path(&self) -> PathBuf;

    fn exists(&self) -> bool;

    /// Write [`AppConfig::defaults`]. Fails with `AlreadyExists` when a file
    /// is already there.
    async fn init(&self) -> Result<(), ConfigError>;

    /// Load, apply `edit`, and save. Nothing is written if `edit` fails.
    async fn update<F>(&self, edit: F) -> Result<AppConfig, ConfigError>
    where
        F: FnOnce(&mut AppConfig) -> Result<(), ConfigError> + Send,
    {
        let mut config = self.load().await?;
        edit(&mut config)?;
        self.save(&config).await?;
        Ok(config)
    }
}
