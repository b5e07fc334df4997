use crate::{DatebookError, DatebookResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    pub notice_capacity: usize,
    pub sync: SyncSettings,
    pub selection: SelectionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Seconds between background refetches of dated events.
    pub events_interval_secs: u64,
    /// Refresh the postponed backlog on focus triggers too.
    pub backlog_on_focus: bool,
    /// Discard fetch results that resolve after a newer one was applied.
    pub sequence_guard: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    pub settle_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            notice_capacity: 50,
            sync: SyncSettings::default(),
            selection: SelectionSettings::default(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            events_interval_secs: 10,
            backlog_on_focus: true,
            sequence_guard: true,
        }
    }
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            settle_delay_ms: 150,
        }
    }
}

impl SyncSettings {
    pub fn events_interval(&self) -> Duration {
        Duration::from_secs(self.events_interval_secs.max(1))
    }
}

impl SelectionSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/datebook/config.toml"))
        }
        #[cfg(not(target_os = "macos"))]
        {
            dirs::config_dir().map(|config| config.join("datebook").join("config.toml"))
        }
    }

    /// Loads the default config file, falling back to defaults on any problem.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default()
    }

    /// Loads a config file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> DatebookResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> DatebookResult<Self> {
        toml::from_str(content).map_err(|e| DatebookError::Config(e.to_string()))
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }
}
