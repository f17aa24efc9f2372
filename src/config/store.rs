use super::BridgeConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

pub const CONFIG_DIR_NAME: &str = ".modemscope";
pub const CONFIG_FILE_NAME: &str = "bridge_config.json";

/// Persists the bridge configuration as JSON on disk.
pub struct ConfigStore {
    config_path: PathBuf,
    state: Arc<RwLock<BridgeConfig>>,
}

impl ConfigStore {
    /// Creates a store with default in-memory state.
    ///
    /// Call `load()` afterwards to read the file (creating it if missing).
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            config_path,
            state: Arc::new(RwLock::new(BridgeConfig::default())),
        }
    }

    /// Store at `~/.modemscope/bridge_config.json`, falling back to the
    /// working directory when no home directory is known.
    pub fn at_default_location() -> Result<Self> {
        let base = match dirs::home_dir() {
            Some(home) => home,
            None => std::env::current_dir().context("No home or working directory available")?,
        };
        Ok(Self::new(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub async fn ensure_config_file(&self) -> Result<()> {
        if !self.config_path.exists() {
            if let Some(parent) = self.config_path.parent() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }

            let json = serde_json::to_string_pretty(&BridgeConfig::default())?;
            fs::write(&self.config_path, json)
                .await
                .context("Failed to write default config")?;
            log::info!("Wrote default bridge config to {}", self.config_path.display());
        }

        Ok(())
    }

    pub async fn load(&self) -> Result<BridgeConfig> {
        self.ensure_config_file().await?;

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read config file")?;

        let config: BridgeConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        *self.state.write().await = config.clone();
        Ok(config)
    }

    pub async fn save(&self) -> Result<()> {
        let json = {
            let config = self.state.read().await;
            serde_json::to_string_pretty(&*config)?
        };

        let temp_path = self.config_path.with_extension("tmp");
        fs::write(&temp_path, json)
            .await
            .context("Failed to write temporary config file")?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .context("Failed to atomically update config file")?;

        Ok(())
    }

    pub async fn current(&self) -> BridgeConfig {
        self.state.read().await.clone()
    }

    pub async fn update(&self, config: BridgeConfig) -> Result<()> {
        *self.state.write().await = config;
        self.save().await
    }
}
