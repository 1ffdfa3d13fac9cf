//! Application Configuration
//!
//! User settings and preferences stored in TOML format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend endpoints
    pub backend: BackendSettings,
    /// Push-channel sync settings
    pub sync: SyncSettings,
    /// Overlay window settings
    pub overlay: OverlaySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            sync: SyncSettings::default(),
            overlay: OverlaySettings::default(),
        }
    }
}

/// Addresses of the scoring backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Control endpoint base URL
    pub base_url: String,
    /// Push channel address
    pub ws_url: String,
    /// Window tracking feed address
    pub tracking_url: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            ws_url: "ws://127.0.0.1:8000/ws".to_string(),
            tracking_url: "ws://127.0.0.1:8000/ws/tracking".to_string(),
        }
    }
}

/// Push-channel sync settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Delay before the automatic reconnect attempt, in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 3000,
        }
    }
}

/// Overlay window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Width restored when no placement was saved
    pub default_width: u32,
    /// Height restored when no placement was saved
    pub default_height: u32,
    /// Clear click-through when leaving overlay mode instead of keeping the
    /// toggle sticky across overlay sessions
    pub reset_click_through_on_exit: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            default_width: 900,
            default_height: 670,
            reset_click_through_on_exit: false,
        }
    }
}

/// Default configuration file location
pub fn default_config_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "scoreoverlay", "ScoreOverlay")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir.join("config.toml"))
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        assert_eq!(config.backend.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.backend.ws_url, "ws://127.0.0.1:8000/ws");
        assert_eq!(config.sync.reconnect_delay_ms, 3000);
        assert_eq!(config.overlay.default_width, 900);
        assert_eq!(config.overlay.default_height, 670);
        assert!(!config.overlay.reset_click_through_on_exit);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AppConfig::default();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.backend.base_url, parsed.backend.base_url);
        assert_eq!(config.sync.reconnect_delay_ms, parsed.sync.reconnect_delay_ms);
        assert_eq!(config.overlay.default_width, parsed.overlay.default_width);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [backend]
            base_url = "http://10.0.0.5:9000"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.backend.base_url, "http://10.0.0.5:9000");
        // Unspecified fields keep their defaults
        assert_eq!(parsed.backend.ws_url, "ws://127.0.0.1:8000/ws");
        assert_eq!(parsed.sync.reconnect_delay_ms, 3000);
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.overlay.reset_click_through_on_exit = true;

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert!(loaded.overlay.reset_click_through_on_exit);
        assert_eq!(loaded.backend.base_url, config.backend.base_url);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
