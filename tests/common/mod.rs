#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use evidence_offline::application::services::SyncService;
use evidence_offline::infrastructure::offline::SqliteOfflineQueue;
use evidence_offline::shared::config::{DatabaseConfig, SyncConfig};
use mocks::ScriptedRemote;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;
use std::sync::Arc;

pub struct SyncTestContext {
    pub queue: Arc<SqliteOfflineQueue>,
    pub remote: Arc<ScriptedRemote>,
    pub service: SyncService,
}

pub async fn setup_queue(quota_bytes: u64) -> Arc<SqliteOfflineQueue> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    let queue = SqliteOfflineQueue::new(pool, quota_bytes);
    queue.migrate().await.expect("migrations");
    Arc::new(queue)
}

pub async fn open_file_queue(path: &Path) -> SqliteOfflineQueue {
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: 1,
    };
    SqliteOfflineQueue::connect(&config, u64::MAX)
        .await
        .expect("file-backed queue")
}

pub async fn setup_sync() -> SyncTestContext {
    setup_sync_with(SyncConfig::default()).await
}

pub async fn setup_sync_with(config: SyncConfig) -> SyncTestContext {
    let queue = setup_queue(u64::MAX).await;
    let remote = Arc::new(ScriptedRemote::new());
    let service = SyncService::new(queue.clone(), remote.clone(), config);
    SyncTestContext {
        queue,
        remote,
        service,
    }
}
