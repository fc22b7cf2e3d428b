// ⚙️ Application configuration (app_config.json)
//
// Every field has a default, so a partial or missing file still yields a full config.

use crate::catalog::DEFAULT_DATA_FILE;
use crate::error::StoreError;
use crate::storage::{to_pretty_json, write_atomically};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_CONFIG_FILE: &str = "app_config.json";

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "QUANTUMLINK_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Where product QR images are written
    #[serde(default = "default_qr_folder")]
    pub qr_folder: PathBuf,

    #[serde(default = "default_theme")]
    pub theme: String,

    /// Last window geometry reported by the front end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<String>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Listen address of the HTTP API
    #[serde(default = "default_server_addr")]
    pub server_addr: String,
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_qr_folder() -> PathBuf {
    PathBuf::from("QRCodes")
}

fn default_theme() -> String {
    "cyborg".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_server_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_file: default_data_file(),
            qr_folder: default_qr_folder(),
            theme: default_theme(),
            geometry: None,
            log_level: default_log_level(),
            server_addr: default_server_addr(),
        }
    }
}

impl AppConfig {
    /// Config path from `QUANTUMLINK_CONFIG`, or `app_config.json`
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load config, falling back to defaults when the file is missing or unusable
    pub fn load<P: AsRef<Path>>(path: P) -> AppConfig {
        let path = path.as_ref();
        Self::try_load(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "using default configuration");
            AppConfig::default()
        })
    }

    /// Like `load`, but an unreadable or corrupt file is an error. A missing file is not.
    pub fn try_load<P: AsRef<Path>>(path: P) -> Result<AppConfig, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(path).map_err(|e| StoreError::storage(path, e))?;
        serde_json::from_str(&content).map_err(|e| StoreError::storage(path, e))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        let bytes = to_pretty_json(self).map_err(|e| StoreError::storage(path, e))?;
        write_atomically(path, &bytes)
    }
}

/// Install the global `tracing` subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A second init (tests, embedding) keeps the first subscriber
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.data_file, PathBuf::from("products_database.json"));
        assert_eq!(config.qr_folder, PathBuf::from("QRCodes"));
        assert_eq!(config.theme, "cyborg");
        assert_eq!(config.geometry, None);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.server_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(AppConfig::load(dir.path().join("none.json")), AppConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, r#"{ "theme": "flatly", "geometry": "800x600+10+10" }"#).unwrap();

        let config = AppConfig::load(&path);
        assert_eq!(config.theme, "flatly");
        assert_eq!(config.geometry.as_deref(), Some("800x600+10+10"));
        assert_eq!(config.data_file, PathBuf::from("products_database.json"));
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "theme = flatly").unwrap();

        assert_eq!(AppConfig::load(&path), AppConfig::default());
        assert!(AppConfig::try_load(&path).unwrap_err().is_storage());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let config = AppConfig {
            theme: "darkly".to_string(),
            data_file: dir.path().join("db.json"),
            ..AppConfig::default()
        };
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path), config);
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging("debug");
        init_logging("info");
    }
}
