use crate::application::ports::evidence_remote::{EvidenceRemote, RemoteError};
use crate::application::ports::offline_queue::OfflineQueue;
use crate::application::ports::sync_trigger::SyncTrigger;
use crate::domain::entities::offline::{PendingDraft, PendingRecord, PhotoDraft, SyncReport};
use crate::domain::value_objects::{BagReference, RecordKind, RemoteBagId};
use crate::infrastructure::offline::metrics;
use crate::shared::config::SyncConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Per-cycle bookkeeping: counters plus the local-to-remote bag ids learned
/// while draining the bag partition.
#[derive(Default)]
struct SyncCycle {
    report: SyncReport,
    resolved_bags: HashMap<String, RemoteBagId>,
}

/// Replays queued drafts against the remote system.
///
/// Partitions drain strictly in `RecordKind::SYNC_ORDER`, one record at a time.
/// A failing record is counted and left queued; only queue errors end a cycle early.
pub struct SyncService {
    queue: Arc<dyn OfflineQueue>,
    remote: Arc<dyn EvidenceRemote>,
    config: SyncConfig,
    gate: Mutex<()>,
}

impl SyncService {
    pub fn new(
        queue: Arc<dyn OfflineQueue>,
        remote: Arc<dyn EvidenceRemote>,
        config: SyncConfig,
    ) -> Self {
        Self {
            queue,
            remote,
            config,
            gate: Mutex::new(()),
        }
    }

    /// Runs one sync cycle, waiting for any cycle already in flight.
    pub async fn sync_offline_data(&self) -> Result<SyncReport, AppError> {
        let _guard = self.gate.lock().await;
        self.run_cycle().await
    }

    /// Manual "sync now": refuses instead of waiting when a cycle is running.
    pub async fn try_sync_now(&self) -> Result<SyncReport, AppError> {
        let _guard = self.gate.try_lock().map_err(|_| AppError::SyncInProgress)?;
        self.run_cycle().await
    }

    pub fn is_syncing(&self) -> bool {
        self.gate.try_lock().is_err()
    }

    async fn run_cycle(&self) -> Result<SyncReport, AppError> {
        let started = Instant::now();
        let mut cycle = SyncCycle::default();

        self.sync_bags(&mut cycle).await?;
        self.sync_dependents(RecordKind::CustodyLog, &mut cycle)
            .await?;
        self.sync_dependents(RecordKind::Photo, &mut cycle).await?;

        if cycle.report.success > 0 {
            let removed = self.queue.remove_synced().await?;
            tracing::debug!(target: "offline::sync", removed, "cleaned up synced records");
        }

        let status = self.queue.recompute_status().await?;
        let mut report = cycle.report;
        report.pending_count = status.pending_count;

        metrics::record_cycle(&report, started.elapsed());
        tracing::info!(
            target: "offline::sync",
            success = report.success,
            failed = report.failed,
            dead_lettered = report.dead_lettered,
            pending = report.pending_count,
            "offline sync cycle finished"
        );
        Ok(report)
    }

    async fn sync_bags(&self, cycle: &mut SyncCycle) -> Result<(), AppError> {
        let kind = RecordKind::EvidenceBag;
        for record in self.queue.list_unsynced(kind).await? {
            let PendingDraft::EvidenceBag(draft) = &record.payload else {
                continue;
            };

            // A previous cycle may have created the bag remotely and then
            // failed to flip the flag; never create it twice.
            let reference = BagReference::from(&record.id);
            let remote_id = match self.queue.resolve_bag(&reference).await? {
                Some(existing) => Ok(existing),
                None => self.call_remote(self.remote.create_evidence_bag(draft)).await,
            };

            match remote_id {
                Ok(remote_id) => {
                    self.queue
                        .record_bag_resolution(&record.id, &remote_id)
                        .await?;
                    self.queue.mark_synced(kind, &record.id).await?;
                    tracing::debug!(
                        target: "offline::sync",
                        local_id = %record.id,
                        remote_id = %remote_id,
                        "evidence bag synced"
                    );
                    cycle
                        .resolved_bags
                        .insert(record.id.as_str().to_string(), remote_id);
                    cycle.report.success += 1;
                }
                Err(err) => {
                    self.handle_failure(cycle, &record, &err.to_string())
                        .await?
                }
            }
        }
        Ok(())
    }

    async fn sync_dependents(
        &self,
        kind: RecordKind,
        cycle: &mut SyncCycle,
    ) -> Result<(), AppError> {
        for record in self.queue.list_unsynced(kind).await? {
            let Some(reference) = record.payload.bag_reference() else {
                continue;
            };

            let Some(bag_id) = self.resolve_dependency(cycle, reference).await? else {
                // Neither resolved nor queued: the bag is gone for good.
                if !self.queue.has_queued_bag(reference).await? {
                    let error = format!("bag {reference} is no longer queued");
                    self.handle_failure(cycle, &record, &error).await?;
                    continue;
                }
                cycle.report.failed += 1;
                tracing::warn!(
                    target: "offline::sync",
                    id = %record.id,
                    bag = %reference,
                    "bag not synced yet, deferring dependent record"
                );
                continue;
            };

            let outcome = match &record.payload {
                PendingDraft::CustodyLog(draft) => {
                    self.call_remote(self.remote.append_custody_entry(&bag_id, draft))
                        .await
                }
                PendingDraft::Photo(draft) => self.upload_photo(&bag_id, draft).await,
                PendingDraft::EvidenceBag(_) => continue,
            };

            match outcome {
                Ok(()) => {
                    self.queue.mark_synced(kind, &record.id).await?;
                    cycle.report.success += 1;
                }
                Err(err) => {
                    self.handle_failure(cycle, &record, &err.to_string())
                        .await?
                }
            }
        }
        Ok(())
    }

    async fn resolve_dependency(
        &self,
        cycle: &SyncCycle,
        reference: &BagReference,
    ) -> Result<Option<RemoteBagId>, AppError> {
        if let Some(remote_id) = cycle.resolved_bags.get(reference.as_str()) {
            return Ok(Some(remote_id.clone()));
        }
        self.queue.resolve_bag(reference).await
    }

    async fn upload_photo(
        &self,
        bag_id: &RemoteBagId,
        draft: &PhotoDraft,
    ) -> Result<(), RemoteError> {
        let stored = self
            .call_remote(self.remote.upload_photo_content(bag_id, draft))
            .await?;
        self.call_remote(self.remote.insert_photo_record(bag_id, &stored, draft))
            .await
    }

    async fn call_remote<T, F>(&self, call: F) -> Result<T, RemoteError>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        let limit = self.config.remote_timeout();
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(limit.as_secs())),
        }
    }

    async fn handle_failure(
        &self,
        cycle: &mut SyncCycle,
        record: &PendingRecord,
        error: &str,
    ) -> Result<(), AppError> {
        cycle.report.failed += 1;
        let dead_lettered = self
            .queue
            .record_failure(record.kind(), &record.id, error, self.config.max_retry)
            .await?;

        if dead_lettered {
            cycle.report.dead_lettered += 1;
            tracing::error!(
                target: "offline::sync",
                id = %record.id,
                partition = record.kind().partition(),
                error,
                "record exceeded retry budget, moved to dead letters"
            );
        } else {
            tracing::warn!(
                target: "offline::sync",
                id = %record.id,
                partition = record.kind().partition(),
                attempt = record.retry_count + 1,
                error,
                "record sync failed, will retry"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl SyncTrigger for SyncService {
    async fn sync_offline_data(&self) -> Result<SyncReport, AppError> {
        SyncService::sync_offline_data(self).await
    }
}
