use super::request::AssetResponse;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Named response caches, keyed by request url within each cache.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Creates the cache if it does not exist yet.
    async fn open(&self, cache: &str) -> Result<(), AppError>;
    async fn put(&self, cache: &str, key: &str, response: AssetResponse) -> Result<(), AppError>;
    async fn match_key(&self, cache: &str, key: &str) -> Result<Option<AssetResponse>, AppError>;
    async fn delete_cache(&self, cache: &str) -> Result<bool, AppError>;
    async fn cache_names(&self) -> Result<Vec<String>, AppError>;
}

#[derive(Default, Clone)]
pub struct MemoryCacheStorage {
    caches: Arc<RwLock<HashMap<String, HashMap<String, AssetResponse>>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entry_count(&self, cache: &str) -> usize {
        let caches = self.caches.read().await;
        caches.get(cache).map(HashMap::len).unwrap_or(0)
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, cache: &str) -> Result<(), AppError> {
        let mut caches = self.caches.write().await;
        caches.entry(cache.to_string()).or_default();
        Ok(())
    }

    async fn put(&self, cache: &str, key: &str, response: AssetResponse) -> Result<(), AppError> {
        let mut caches = self.caches.write().await;
        caches
            .entry(cache.to_string())
            .or_default()
            .insert(key.to_string(), response);
        Ok(())
    }

    async fn match_key(&self, cache: &str, key: &str) -> Result<Option<AssetResponse>, AppError> {
        let caches = self.caches.read().await;
        Ok(caches.get(cache).and_then(|entries| entries.get(key)).cloned())
    }

    async fn delete_cache(&self, cache: &str) -> Result<bool, AppError> {
        let mut caches = self.caches.write().await;
        Ok(caches.remove(cache).is_some())
    }

    async fn cache_names(&self) -> Result<Vec<String>, AppError> {
        let caches = self.caches.read().await;
        let mut names: Vec<String> = caches.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
