//! Application configuration

use crate::query::{SortDirection, SortKey};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `api.base_url`
pub const API_URL_ENV: &str = "FILEDESK_API_URL";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub api: ApiConfig,
    pub query: QueryConfig,
    pub dashboard: DashboardConfig,
    pub keybindings: HashMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            api: ApiConfig::default(),
            query: QueryConfig::default(),
            dashboard: DashboardConfig::default(),
            keybindings: default_keybindings(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub theme: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
        }
    }
}

/// Backend connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Files query behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Extra attempts after a failed list fetch
    pub retry: u32,
    pub retry_delay_ms: u64,
    /// Fetched data is served without refetching for this long
    pub stale_time_secs: u64,
    pub refetch_on_focus: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            retry: 1,
            retry_delay_ms: 1000,
            stale_time_secs: 30,
            refetch_on_focus: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sort_key: SortKey::UploadedDate,
            sort_direction: SortDirection::Desc,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location, then apply env overrides.
    ///
    /// A missing file yields defaults; a malformed one is logged and ignored.
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::config_path()).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable configuration: {}", e);
            Self::default()
        });
        config.apply_env_overrides();
        config
    }

    /// Load configuration from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::info!("API base URL overridden by {}", API_URL_ENV);
                self.api.base_url = url.trim().to_string();
            }
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "FileDesk", "FileDesk")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}

fn default_keybindings() -> HashMap<String, Vec<String>> {
    let mut kb = HashMap::new();

    // Detail view
    kb.insert("nav.next_item".into(), vec!["Right".into(), "j".into()]);
    kb.insert("nav.prev_item".into(), vec!["Left".into(), "k".into()]);
    kb.insert("view.next_page".into(), vec!["PageDown".into()]);
    kb.insert("view.prev_page".into(), vec!["PageUp".into()]);

    // App
    kb.insert("app.upload".into(), vec!["Ctrl+u".into()]);
    kb.insert("app.search".into(), vec!["Ctrl+f".into(), "/".into()]);
    kb.insert("app.dashboard".into(), vec!["Ctrl+1".into()]);
    kb.insert("app.details".into(), vec!["Ctrl+2".into()]);
    kb.insert("app.exit".into(), vec!["Ctrl+q".into()]);

    kb
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.query.retry, 1);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"http://files.internal:8080\"\n\n[dashboard]\nsort_key = \"fileName\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.api.base_url, "http://files.internal:8080");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.dashboard.sort_key, SortKey::FileName);
        assert_eq!(config.dashboard.sort_direction, SortDirection::Desc);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.general.theme = "dark".into();
        config.query.stale_time_secs = 5;
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_legacy_detail_section_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[detail]\nitems_per_page = 10\n").unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbase_url = ").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
