use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ENV_SERVER_URL: &str = "PAPERCHAT_SERVER_URL";

fn default_server_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_refresh_secs() -> u64 {
    13 * 60
}

fn default_session_ttl_secs() -> u64 {
    30
}

fn default_max_upload_bytes() -> u64 {
    crate::storage::MAX_UPLOAD_BYTES
}

fn default_log_retention_days() -> u64 {
    14
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Silent credential-renewal cadence.
    #[serde(default = "default_refresh_secs")]
    pub refresh_interval_secs: u64,
    /// Session reads inside this window are served from cache.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            refresh_interval_secs: default_refresh_secs(),
            session_ttl_secs: default_session_ttl_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            log_retention_days: default_log_retention_days(),
        }
    }
}

impl ClientConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Missing file means defaults; a present-but-broken file is an error the
    /// user should see rather than silently lose their settings.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| crate::ClientError::Validation(format!("Cannot read {}: {}", path.display(), e)))?;
            serde_yaml::from_str(&raw)
                .map_err(|e| crate::ClientError::Validation(format!("Bad config {}: {}", path.display(), e)))?
        } else {
            Self::default()
        };
        if let Ok(url) = std::env::var(ENV_SERVER_URL) {
            if !url.trim().is_empty() {
                config.server_url = url.trim().to_string();
            }
        }
        Ok(config)
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        return dir.join("paperchat");
    }
    dirs::home_dir()
        .map(|home| home.join(".paperchat"))
        .unwrap_or_else(|| PathBuf::from(".paperchat"))
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("config.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = ClientConfig::load(&tmp.path().join("config.yaml")).unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(13 * 60));
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "server_url: https://api.example.com\n").unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.server_url, "https://api.example.com");
        assert_eq!(config.session_ttl_secs, 30);
    }

    #[test]
    fn broken_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "server_url: [oops\n").unwrap();
        assert!(ClientConfig::load(&path).is_err());
    }
}
