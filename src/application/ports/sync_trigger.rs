use crate::domain::entities::offline::SyncReport;
use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait SyncTrigger: Send + Sync {
    async fn sync_offline_data(&self) -> Result<SyncReport, AppError>;
}
