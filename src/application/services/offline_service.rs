use crate::application::ports::offline_queue::OfflineQueue;
use crate::domain::entities::offline::{
    CustodyLogDraft, DEFAULT_BAG_STATUS, EvidenceBagDraft, PendingDraft, PendingRecord,
    PhotoDraft, SyncStatusSnapshot,
};
use crate::domain::value_objects::{BagReference, CustodyAction, PendingRecordId, RecordKind};
use crate::shared::config::StorageConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct NewEvidenceBag {
    pub bag_type: String,
    pub description: String,
    pub collected_by: String,
    pub location: String,
    pub notes: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCustodyEntry {
    /// Server bag id, or the queue id of a bag that is still pending.
    pub bag_id: String,
    pub action: CustodyAction,
    pub performed_by: String,
    pub performed_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub bag_id: String,
    pub file_name: String,
    pub content_type: String,
    pub notes: Option<String>,
    pub content: Bytes,
}

#[async_trait]
pub trait OfflineServiceTrait: Send + Sync {
    async fn queue_evidence_bag(&self, bag: NewEvidenceBag) -> Result<PendingRecordId, AppError>;
    async fn queue_custody_entry(
        &self,
        entry: NewCustodyEntry,
    ) -> Result<PendingRecordId, AppError>;
    async fn queue_photo(&self, photo: NewPhoto) -> Result<PendingRecordId, AppError>;
    async fn cancel(&self, kind: RecordKind, id: &PendingRecordId) -> Result<bool, AppError>;
    async fn status(&self) -> Result<SyncStatusSnapshot, AppError>;
    async fn dead_letters(&self, kind: RecordKind) -> Result<Vec<PendingRecord>, AppError>;
    async fn retry_dead_letter(
        &self,
        kind: RecordKind,
        id: &PendingRecordId,
    ) -> Result<bool, AppError>;
}

pub struct OfflineService {
    queue: Arc<dyn OfflineQueue>,
    max_photo_bytes: u64,
}

impl OfflineService {
    pub fn new(queue: Arc<dyn OfflineQueue>, storage: &StorageConfig) -> Self {
        Self {
            queue,
            max_photo_bytes: storage.max_photo_bytes,
        }
    }

    fn required(field: &str, value: &str) -> Result<(), AppError> {
        if value.trim().is_empty() {
            return Err(AppError::ValidationError(format!("{field} is required")));
        }
        Ok(())
    }

    fn bag_reference(value: String) -> Result<BagReference, AppError> {
        BagReference::new(value).map_err(AppError::ValidationError)
    }

    /// A local reference must name a bag that is still queued or has already
    /// been resolved to a server id.
    async fn known_bag_reference(&self, value: String) -> Result<BagReference, AppError> {
        let reference = Self::bag_reference(value)?;
        if reference.is_local()
            && !self.queue.has_queued_bag(&reference).await?
            && self.queue.resolve_bag(&reference).await?.is_none()
        {
            return Err(AppError::NotFound(format!("bag {reference} is not queued")));
        }
        Ok(reference)
    }

    fn ensure_kind(kind: RecordKind, id: &PendingRecordId) -> Result<(), AppError> {
        if id.kind() != Some(kind) {
            return Err(AppError::ValidationError(format!(
                "{id} does not belong to {}",
                kind.partition()
            )));
        }
        Ok(())
    }

    /// Queued custody entries and photos that point at a queued bag.
    async fn dependents_of(&self, bag: &BagReference) -> Result<Vec<PendingRecord>, AppError> {
        let mut found = Vec::new();
        for kind in [RecordKind::CustodyLog, RecordKind::Photo] {
            let mut records = self.queue.list_unsynced(kind).await?;
            records.extend(self.queue.list_dead_letters(kind).await?);
            found.extend(
                records
                    .into_iter()
                    .filter(|record| record.payload.bag_reference() == Some(bag)),
            );
        }
        Ok(found)
    }
}

#[async_trait]
impl OfflineServiceTrait for OfflineService {
    async fn queue_evidence_bag(&self, bag: NewEvidenceBag) -> Result<PendingRecordId, AppError> {
        Self::required("bag_type", &bag.bag_type)?;
        Self::required("description", &bag.description)?;
        Self::required("collected_by", &bag.collected_by)?;
        Self::required("location", &bag.location)?;

        let draft = EvidenceBagDraft {
            display_id: EvidenceBagDraft::generate_display_id(Utc::now()),
            bag_type: bag.bag_type,
            description: bag.description,
            collected_by: bag.collected_by,
            location: bag.location,
            notes: bag.notes,
            status: bag
                .status
                .filter(|status| !status.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BAG_STATUS.to_string()),
        };
        let id = self.queue.enqueue(PendingDraft::EvidenceBag(draft)).await?;
        tracing::debug!(target: "offline::service", id = %id, "queued evidence bag");
        Ok(id)
    }

    async fn queue_custody_entry(
        &self,
        entry: NewCustodyEntry,
    ) -> Result<PendingRecordId, AppError> {
        Self::required("performed_by", &entry.performed_by)?;

        let draft = CustodyLogDraft {
            bag_id: self.known_bag_reference(entry.bag_id).await?,
            action: entry.action,
            performed_by: entry.performed_by,
            performed_at: entry.performed_at.unwrap_or_else(Utc::now),
            location: entry.location,
            notes: entry.notes,
        };
        let id = self.queue.enqueue(PendingDraft::CustodyLog(draft)).await?;
        tracing::debug!(target: "offline::service", id = %id, "queued custody entry");
        Ok(id)
    }

    async fn queue_photo(&self, photo: NewPhoto) -> Result<PendingRecordId, AppError> {
        Self::required("file_name", &photo.file_name)?;
        Self::required("content_type", &photo.content_type)?;
        if photo.content.is_empty() {
            return Err(AppError::ValidationError("Photo content is empty".to_string()));
        }
        if photo.content.len() as u64 > self.max_photo_bytes {
            return Err(AppError::ValidationError(format!(
                "Photo is {} bytes, limit is {}",
                photo.content.len(),
                self.max_photo_bytes
            )));
        }

        let digest = format!("{:x}", Sha256::digest(&photo.content));
        let draft = PhotoDraft {
            bag_id: self.known_bag_reference(photo.bag_id).await?,
            file_name: photo.file_name,
            content_type: photo.content_type,
            notes: photo.notes,
            digest,
            content: photo.content,
        };
        let id = self.queue.enqueue(PendingDraft::Photo(draft)).await?;
        tracing::debug!(target: "offline::service", id = %id, "queued photo");
        Ok(id)
    }

    /// Cancelling a queued bag also drops the queued entries that point at it,
    /// since they could never resolve.
    async fn cancel(&self, kind: RecordKind, id: &PendingRecordId) -> Result<bool, AppError> {
        Self::ensure_kind(kind, id)?;

        let dependents = if kind == RecordKind::EvidenceBag {
            self.dependents_of(&BagReference::from(id)).await?
        } else {
            Vec::new()
        };

        if !self.queue.remove(kind, id).await? {
            return Ok(false);
        }

        for record in &dependents {
            self.queue.remove(record.kind(), &record.id).await?;
        }
        tracing::info!(
            target: "offline::service",
            id = %id,
            dependents = dependents.len(),
            "cancelled queued record"
        );
        Ok(true)
    }

    async fn status(&self) -> Result<SyncStatusSnapshot, AppError> {
        self.queue.status().await
    }

    async fn dead_letters(&self, kind: RecordKind) -> Result<Vec<PendingRecord>, AppError> {
        self.queue.list_dead_letters(kind).await
    }

    async fn retry_dead_letter(
        &self,
        kind: RecordKind,
        id: &PendingRecordId,
    ) -> Result<bool, AppError> {
        Self::ensure_kind(kind, id)?;
        self.queue.requeue_dead_letter(kind, id).await
    }
}
