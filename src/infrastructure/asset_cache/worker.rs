use super::request::{AssetRequest, AssetResponse, FetchError, RequestClass};
use super::storage::CacheStorage;
use crate::shared::config::AssetCacheConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;

pub const CACHE_PREFIX: &str = "evidence-offline-";

#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    pub purged: Vec<String>,
    /// Open clients are taken over immediately instead of after a reload.
    pub claim_clients: bool,
}

/// Keeps the application shell reachable without network.
pub struct OfflineAssetWorker {
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn AssetFetcher>,
    cache_name: String,
    shell_url: String,
    precache: Vec<String>,
}

impl OfflineAssetWorker {
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn AssetFetcher>,
        config: &AssetCacheConfig,
    ) -> Self {
        Self {
            storage,
            fetcher,
            cache_name: Self::cache_name_for(&config.version),
            shell_url: config.shell_url.clone(),
            precache: config.precache.clone(),
        }
    }

    pub fn cache_name_for(version: &str) -> String {
        format!("{CACHE_PREFIX}{version}")
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    /// Fetches the whole precache list before storing any of it, so a failed
    /// install leaves the cache untouched.
    pub async fn install(&self) -> Result<usize, AppError> {
        let requests: Vec<AssetRequest> = self
            .precache
            .iter()
            .map(|url| AssetRequest::get(url.as_str()))
            .collect();
        let responses = join_all(requests.iter().map(|req| self.fetcher.fetch(req))).await;

        let mut fetched = Vec::with_capacity(requests.len());
        for (request, response) in requests.iter().zip(responses) {
            let response = response.map_err(|err| {
                AppError::Storage(format!("Precache of {} failed: {err}", request.url))
            })?;
            if !response.is_success() {
                return Err(AppError::Storage(format!(
                    "Precache of {} returned status {}",
                    request.url, response.status
                )));
            }
            fetched.push((request.cache_key().to_string(), response));
        }

        self.storage.open(&self.cache_name).await?;
        let count = fetched.len();
        for (key, response) in fetched {
            self.storage.put(&self.cache_name, &key, response).await?;
        }
        tracing::info!(target: "offline::assets", cache = %self.cache_name, count, "precached app shell");
        Ok(count)
    }

    pub async fn activate(&self) -> Result<ActivationReport, AppError> {
        let mut purged = Vec::new();
        for name in self.storage.cache_names().await? {
            if name != self.cache_name && self.storage.delete_cache(&name).await? {
                purged.push(name);
            }
        }
        if !purged.is_empty() {
            tracing::info!(target: "offline::assets", ?purged, "purged stale caches");
        }
        Ok(ActivationReport {
            purged,
            claim_clients: true,
        })
    }

    pub async fn handle_fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        if !request.is_get() {
            return self.fetcher.fetch(request).await;
        }

        match RequestClass::classify(request) {
            RequestClass::Navigation => self.network_first(request, true).await,
            RequestClass::ScriptOrStyle => self.network_first(request, false).await,
            RequestClass::Static => self.cache_first(request).await,
        }
    }

    /// Scripts and styles never fall back to the shell document, which would
    /// arrive with the wrong content type.
    async fn network_first(
        &self,
        request: &AssetRequest,
        shell_fallback: bool,
    ) -> Result<AssetResponse, FetchError> {
        let network_err = match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    self.store(request.cache_key(), &response).await;
                }
                return Ok(response);
            }
            Err(err) => err,
        };

        tracing::debug!(target: "offline::assets", url = %request.url, error = %network_err, "network failed, trying cache");
        if let Some(cached) = self.lookup(request.cache_key()).await {
            return Ok(cached);
        }
        if shell_fallback {
            if let Some(shell) = self.lookup(&self.shell_url).await {
                return Ok(shell);
            }
        }
        Err(network_err)
    }

    async fn cache_first(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        if let Some(cached) = self.lookup(request.cache_key()).await {
            return Ok(cached);
        }
        let response = self.fetcher.fetch(request).await?;
        if response.is_cacheable() {
            self.store(request.cache_key(), &response).await;
        }
        Ok(response)
    }

    async fn lookup(&self, key: &str) -> Option<AssetResponse> {
        match self.storage.match_key(&self.cache_name, key).await {
            Ok(hit) => hit,
            Err(err) => {
                tracing::warn!(target: "offline::assets", key, error = %err, "cache lookup failed");
                None
            }
        }
    }

    async fn store(&self, key: &str, response: &AssetResponse) {
        if let Err(err) = self
            .storage
            .put(&self.cache_name, key, response.clone())
            .await
        {
            tracing::warn!(target: "offline::assets", key, error = %err, "cache write failed");
        }
    }
}
