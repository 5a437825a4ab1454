//! User configuration stored in `config.toml`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const APP_DIR: &str = "vibrax";
const CONFIG_FILE: &str = "config.toml";
const LIKED_STORE_FILE: &str = "liked_songs.json";

pub const ENV_YOUTUBE_API_KEY: &str = "YOUTUBE_API_KEY";
pub const ENV_LIKED_STORE: &str = "VIBRAX_LIKED_STORE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_api_key: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_player_retry_interval_ms")]
    pub player_retry_interval_ms: u64,
    #[serde(default = "default_player_retry_attempts")]
    pub player_retry_attempts: u32,
    #[serde(default = "default_liked_store_path")]
    pub liked_store_path: PathBuf,
    #[serde(default = "default_simulated_track_seconds")]
    pub simulated_track_seconds: f64,
}

fn default_max_results() -> u32 {
    10
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_player_retry_interval_ms() -> u64 {
    500
}

fn default_player_retry_attempts() -> u32 {
    20
}

fn default_liked_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR).join(LIKED_STORE_FILE))
        .unwrap_or_else(|| PathBuf::from(".cache").join(LIKED_STORE_FILE))
}

fn default_simulated_track_seconds() -> f64 {
    30.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            youtube_api_key: None,
            max_results: default_max_results(),
            poll_interval_ms: default_poll_interval_ms(),
            player_retry_interval_ms: default_player_retry_interval_ms(),
            player_retry_attempts: default_player_retry_attempts(),
            liked_store_path: default_liked_store_path(),
            simulated_track_seconds: default_simulated_track_seconds(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    /// Load from `path` (or the default location) and apply environment overrides.
    ///
    /// A missing file yields the defaults and a default file is written next to
    /// where it was expected. A file that does not parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
            Self::from_toml(&content)
                .map_err(|e| Error::config(format!("{}: {e}", path.display())))?
        } else {
            let config = Self::default();
            if let Err(e) = config.write_default(&path) {
                tracing::warn!(path = %path.display(), error = %e, "Could not write default config");
            }
            config
        };

        config.apply_env(|key| std::env::var(key).ok());
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn write_default(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply overrides; `lookup` returns the value of an environment variable.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_YOUTUBE_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.youtube_api_key = Some(key);
        }
        if let Some(path) = lookup(ENV_LIKED_STORE).filter(|p| !p.trim().is_empty()) {
            self.liked_store_path = PathBuf::from(path);
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn player_retry_interval(&self) -> Duration {
        Duration::from_millis(self.player_retry_interval_ms)
    }
}
