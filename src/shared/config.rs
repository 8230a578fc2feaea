use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
    pub asset_cache: AssetCacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    /// Failed attempts before a record is dead-lettered. `0` retries forever.
    pub max_retry: u32,
    pub remote_timeout_secs: u64,
    pub status_refresh_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub quota_bytes: u64,
    pub max_photo_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCacheConfig {
    pub version: String,
    pub shell_url: String,
    pub precache: Vec<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/evidence_offline.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_sync: true,
            max_retry: 5,
            remote_timeout_secs: 30,
            status_refresh_secs: 10,
        }
    }
}

impl SyncConfig {
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }

    pub fn status_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.status_refresh_secs)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            quota_bytes: 200 * 1024 * 1024, // 200MB
            max_photo_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Default for AssetCacheConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            shell_url: "/index.html".to_string(),
            precache: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/manifest.json".to_string(),
            ],
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("EVIDENCE_OFFLINE_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("EVIDENCE_OFFLINE_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Some(value) = env_parsed::<u32>("EVIDENCE_OFFLINE_MAX_RETRY") {
            cfg.sync.max_retry = value;
        }
        if let Some(value) = env_parsed::<u64>("EVIDENCE_OFFLINE_REMOTE_TIMEOUT_SECS") {
            cfg.sync.remote_timeout_secs = value.max(1);
        }
        if let Some(value) = env_parsed::<u64>("EVIDENCE_OFFLINE_STATUS_REFRESH_SECS") {
            cfg.sync.status_refresh_secs = value.max(1);
        }
        if let Some(value) = env_parsed::<u64>("EVIDENCE_OFFLINE_QUOTA_BYTES") {
            cfg.storage.quota_bytes = value;
        }
        if let Some(value) = env_parsed::<u64>("EVIDENCE_OFFLINE_MAX_PHOTO_BYTES") {
            cfg.storage.max_photo_bytes = value;
        }
        if let Ok(v) = std::env::var("EVIDENCE_OFFLINE_CACHE_VERSION") {
            if !v.trim().is_empty() {
                cfg.asset_cache.version = v.trim().to_string();
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.max_connections == 0 {
            return Err(AppError::ConfigurationError(
                "Database max_connections must be greater than 0".to_string(),
            ));
        }
        if self.sync.remote_timeout_secs == 0 {
            return Err(AppError::ConfigurationError(
                "Sync remote_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.sync.status_refresh_secs == 0 {
            return Err(AppError::ConfigurationError(
                "Sync status_refresh_secs must be greater than 0".to_string(),
            ));
        }
        if self.storage.max_photo_bytes > self.storage.quota_bytes {
            return Err(AppError::ConfigurationError(
                "Storage max_photo_bytes cannot exceed quota_bytes".to_string(),
            ));
        }
        if self.asset_cache.version.trim().is_empty() {
            return Err(AppError::ConfigurationError(
                "Asset cache version cannot be empty".to_string(),
            ));
        }
        if !self
            .asset_cache
            .precache
            .iter()
            .any(|url| url == &self.asset_cache.shell_url)
        {
            return Err(AppError::ConfigurationError(
                "Asset cache precache list must contain the shell url".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
}
