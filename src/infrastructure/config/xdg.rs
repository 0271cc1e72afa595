//! TOML config file under the platform config directory

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

const APP_DIR: &str = "common-clipboard";
const FILE_NAME: &str = "config.toml";

/// Config store backed by `$XDG_CONFIG_HOME/common-clipboard/config.toml`
/// (or the platform equivalent)
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    pub fn new() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("~/.config"));
        Self {
            path: base.join(APP_DIR).join(FILE_NAME),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    /// Sibling file the new contents are written to before the rename
    fn staging_path(&self) -> PathBuf {
        self.path.with_extension("toml.tmp")
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AppConfig::empty()),
            Err(e) => return Err(ConfigError::ReadError(format!("{}: {}", self.display_path(), e))),
        };

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let write_err = |e: std::io::Error| ConfigError::WriteError(format!("{}: {}", self.display_path(), e));

        let content =
            toml::to_string_pretty(config).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).await.map_err(write_err)?;
        }

        // A crash mid-write leaves the old file intact
        let staging = self.staging_path();
        fs::write(&staging, content).await.map_err(write_err)?;
        fs::rename(&staging, &self.path).await.map_err(write_err)
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(self.display_path()));
        }
        self.save(&AppConfig::defaults()).await
    }
}
