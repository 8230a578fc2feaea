use crate::domain::entities::offline::{PendingDraft, PendingRecord, SyncStatusSnapshot};
use crate::domain::value_objects::{BagReference, PendingRecordId, RecordKind, RemoteBagId};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable, partitioned store of mutations waiting for the remote system.
///
/// Every mutating call refreshes the persisted status record before returning.
#[async_trait]
pub trait OfflineQueue: Send + Sync {
    /// Appends a new unsynced record. Fails with `AppError::QuotaExceeded`
    /// when local storage is exhausted, leaving nothing behind.
    async fn enqueue(&self, draft: PendingDraft) -> Result<PendingRecordId, AppError>;

    /// Unsynced, non-dead-lettered records of `kind` in insertion order.
    async fn list_unsynced(&self, kind: RecordKind) -> Result<Vec<PendingRecord>, AppError>;

    /// Idempotent: unknown or already synced ids are a no-op.
    async fn mark_synced(&self, kind: RecordKind, id: &PendingRecordId) -> Result<(), AppError>;

    async fn remove(&self, kind: RecordKind, id: &PendingRecordId) -> Result<bool, AppError>;

    /// Deletes every synced record across all partitions, then drops bag
    /// resolutions that no remaining record refers to.
    async fn remove_synced(&self) -> Result<u32, AppError>;

    /// Counts a failed attempt. Returns `true` once the record is dead-lettered.
    /// A `max_retry` of zero never dead-letters.
    async fn record_failure(
        &self,
        kind: RecordKind,
        id: &PendingRecordId,
        error: &str,
        max_retry: u32,
    ) -> Result<bool, AppError>;

    async fn list_dead_letters(&self, kind: RecordKind) -> Result<Vec<PendingRecord>, AppError>;

    /// Puts a dead-lettered record back into rotation with a fresh retry budget.
    async fn requeue_dead_letter(
        &self,
        kind: RecordKind,
        id: &PendingRecordId,
    ) -> Result<bool, AppError>;

    async fn record_bag_resolution(
        &self,
        local_id: &PendingRecordId,
        remote_id: &RemoteBagId,
    ) -> Result<(), AppError>;

    /// Whether the bag partition still holds a row for `reference`, in any state.
    async fn has_queued_bag(&self, reference: &BagReference) -> Result<bool, AppError>;

    /// Server id for a bag reference: remote references map to themselves,
    /// local ones go through the resolution table.
    async fn resolve_bag(&self, reference: &BagReference)
        -> Result<Option<RemoteBagId>, AppError>;

    /// Recounts pending records and stamps the current time.
    async fn recompute_status(&self) -> Result<SyncStatusSnapshot, AppError>;

    /// Live counts with the last persisted timestamp.
    async fn status(&self) -> Result<SyncStatusSnapshot, AppError>;
}
