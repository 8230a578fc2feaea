use super::mappers;
use super::rows::{PendingRecordRow, SyncStatusRow};
use crate::application::ports::offline_queue::OfflineQueue;
use crate::domain::entities::offline::{PendingDraft, PendingRecord, SyncStatusSnapshot};
use crate::domain::value_objects::{BagReference, PendingRecordId, RecordKind, RemoteBagId};
use crate::shared::config::DatabaseConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite, SqliteConnection};

const ROW_COLUMNS: &str =
    "id, payload, bag_id, content, timestamp, synced, retry_count, dead_letter, last_error";

fn table(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::EvidenceBag => "pending_evidence_bags",
        RecordKind::CustodyLog => "pending_custody_logs",
        RecordKind::Photo => "pending_photos",
    }
}

fn sum_over_partitions(expression: &str, filter: &str) -> String {
    RecordKind::SYNC_ORDER
        .iter()
        .map(|kind| format!("(SELECT {expression} FROM {} WHERE {filter})", table(*kind)))
        .collect::<Vec<_>>()
        .join(" + ")
}

pub struct SqliteOfflineQueue {
    pool: Pool<Sqlite>,
    quota_bytes: u64,
}

impl SqliteOfflineQueue {
    pub fn new(pool: Pool<Sqlite>, quota_bytes: u64) -> Self {
        Self { pool, quota_bytes }
    }

    pub async fn connect(config: &DatabaseConfig, quota_bytes: u64) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        let queue = Self::new(pool, quota_bytes);
        queue.migrate().await?;
        Ok(queue)
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    async fn stored_bytes(conn: &mut SqliteConnection) -> Result<u64, AppError> {
        let query = format!(
            "SELECT {}",
            sum_over_partitions(
                "COALESCE(SUM(LENGTH(payload) + COALESCE(LENGTH(content), 0)), 0)",
                "1 = 1"
            )
        );
        let (bytes,): (i64,) = sqlx::query_as(&query).fetch_one(&mut *conn).await?;
        Ok(bytes.max(0) as u64)
    }

    async fn live_counts(conn: &mut SqliteConnection) -> Result<(i64, i64), AppError> {
        let query = format!(
            "SELECT {} AS pending_count, {} AS dead_letter_count",
            sum_over_partitions("COUNT(*)", "synced = 0"),
            sum_over_partitions("COUNT(*)", "synced = 0 AND dead_letter = 1"),
        );
        let counts: (i64, i64) = sqlx::query_as(&query).fetch_one(&mut *conn).await?;
        Ok(counts)
    }

    async fn refresh_status(conn: &mut SqliteConnection) -> Result<SyncStatusSnapshot, AppError> {
        let (pending_count, dead_letter_count) = Self::live_counts(conn).await?;
        let now = Utc::now().timestamp_millis();

        sqlx::query(
            r#"
            INSERT INTO sync_status_meta (id, last_sync, pending_count, dead_letter_count)
            VALUES (1, ?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                last_sync = excluded.last_sync,
                pending_count = excluded.pending_count,
                dead_letter_count = excluded.dead_letter_count
            "#,
        )
        .bind(now)
        .bind(pending_count)
        .bind(dead_letter_count)
        .execute(&mut *conn)
        .await?;

        mappers::status_from_row(SyncStatusRow {
            last_sync: Some(now),
            pending_count,
            dead_letter_count,
        })
    }

    async fn fetch_records(
        &self,
        kind: RecordKind,
        filter: &str,
    ) -> Result<Vec<PendingRecord>, AppError> {
        let query = format!(
            "SELECT {ROW_COLUMNS} FROM {} WHERE {filter} ORDER BY rowid ASC",
            table(kind)
        );
        let rows = sqlx::query_as::<_, PendingRecordRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| mappers::record_from_row(kind, row))
            .collect()
    }
}

#[async_trait]
impl OfflineQueue for SqliteOfflineQueue {
    async fn enqueue(&self, draft: PendingDraft) -> Result<PendingRecordId, AppError> {
        let kind = draft.kind();
        let insert = mappers::insert_from_draft(&draft)?;
        let now = Utc::now();
        let id = PendingRecordId::generate(kind, now);

        let mut tx = self.pool.begin().await?;

        let used = Self::stored_bytes(&mut *tx).await?;
        let incoming = insert.stored_size();
        if used.saturating_add(incoming) > self.quota_bytes {
            return Err(AppError::QuotaExceeded(format!(
                "{} needs {incoming} bytes, {} of {} in use",
                kind.partition(),
                used,
                self.quota_bytes
            )));
        }

        let query = format!(
            "INSERT INTO {} (id, payload, bag_id, content, timestamp, synced, retry_count, dead_letter) \
             VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, 0)",
            table(kind)
        );
        sqlx::query(&query)
            .bind(id.as_str())
            .bind(&insert.payload)
            .bind(&insert.bag_id)
            .bind(&insert.content)
            .bind(now.timestamp_millis())
            .execute(&mut *tx)
            .await?;

        Self::refresh_status(&mut *tx).await?;
        tx.commit().await?;

        tracing::debug!(
            target: "offline::queue",
            partition = kind.partition(),
            id = %id,
            bytes = incoming,
            "queued offline record"
        );
        Ok(id)
    }

    async fn list_unsynced(&self, kind: RecordKind) -> Result<Vec<PendingRecord>, AppError> {
        self.fetch_records(kind, "synced = 0 AND dead_letter = 0")
            .await
    }

    async fn mark_synced(&self, kind: RecordKind, id: &PendingRecordId) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let query = format!(
            "UPDATE {} SET synced = 1, last_error = NULL WHERE id = ?1 AND synced = 0",
            table(kind)
        );
        sqlx::query(&query)
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;
        Self::refresh_status(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn remove(&self, kind: RecordKind, id: &PendingRecordId) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let query = format!("DELETE FROM {} WHERE id = ?1", table(kind));
        let result = sqlx::query(&query)
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;
        Self::refresh_status(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_synced(&self) -> Result<u32, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut removed = 0u64;
        for kind in RecordKind::SYNC_ORDER {
            let query = format!("DELETE FROM {} WHERE synced = 1", table(kind));
            removed += sqlx::query(&query).execute(&mut *tx).await?.rows_affected();
        }
        let pruned = sqlx::query(
            r#"
            DELETE FROM resolved_bag_ids
            WHERE local_id NOT IN (SELECT id FROM pending_evidence_bags)
              AND local_id NOT IN (
                  SELECT bag_id FROM pending_custody_logs WHERE bag_id IS NOT NULL
              )
              AND local_id NOT IN (
                  SELECT bag_id FROM pending_photos WHERE bag_id IS NOT NULL
              )
            "#,
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if pruned > 0 {
            tracing::debug!(
                target: "offline::queue",
                pruned,
                "dropped unreferenced bag resolutions"
            );
        }
        Self::refresh_status(&mut *tx).await?;
        tx.commit().await?;
        Ok(u32::try_from(removed).unwrap_or(u32::MAX))
    }

    async fn record_failure(
        &self,
        kind: RecordKind,
        id: &PendingRecordId,
        error: &str,
        max_retry: u32,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let update = format!(
            r#"
            UPDATE {} SET
                retry_count = retry_count + 1,
                last_error = ?2,
                dead_letter = CASE WHEN ?3 > 0 AND retry_count + 1 >= ?3 THEN 1 ELSE 0 END
            WHERE id = ?1 AND synced = 0
            "#,
            table(kind)
        );
        sqlx::query(&update)
            .bind(id.as_str())
            .bind(error)
            .bind(i64::from(max_retry))
            .execute(&mut *tx)
            .await?;

        let select = format!("SELECT dead_letter FROM {} WHERE id = ?1", table(kind));
        let dead_letter: Option<(bool,)> = sqlx::query_as(&select)
            .bind(id.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        Self::refresh_status(&mut *tx).await?;
        tx.commit().await?;
        Ok(dead_letter.map(|(flag,)| flag).unwrap_or(false))
    }

    async fn list_dead_letters(&self, kind: RecordKind) -> Result<Vec<PendingRecord>, AppError> {
        self.fetch_records(kind, "synced = 0 AND dead_letter = 1")
            .await
    }

    async fn requeue_dead_letter(
        &self,
        kind: RecordKind,
        id: &PendingRecordId,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let query = format!(
            "UPDATE {} SET dead_letter = 0, retry_count = 0 WHERE id = ?1 AND dead_letter = 1",
            table(kind)
        );
        let result = sqlx::query(&query)
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;
        Self::refresh_status(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_bag_resolution(
        &self,
        local_id: &PendingRecordId,
        remote_id: &RemoteBagId,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO resolved_bag_ids (local_id, remote_id, resolved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(local_id) DO UPDATE SET
                remote_id = excluded.remote_id,
                resolved_at = excluded.resolved_at
            "#,
        )
        .bind(local_id.as_str())
        .bind(remote_id.as_str())
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn has_queued_bag(&self, reference: &BagReference) -> Result<bool, AppError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pending_evidence_bags WHERE id = ?1)")
                .bind(reference.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn resolve_bag(
        &self,
        reference: &BagReference,
    ) -> Result<Option<RemoteBagId>, AppError> {
        if let Some(remote) = reference.as_remote() {
            return Ok(Some(remote));
        }

        let row: Option<(String,)> =
            sqlx::query_as("SELECT remote_id FROM resolved_bag_ids WHERE local_id = ?1")
                .bind(reference.as_str())
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(remote_id,)| RemoteBagId::new(remote_id).map_err(AppError::DeserializationError))
            .transpose()
    }

    async fn recompute_status(&self) -> Result<SyncStatusSnapshot, AppError> {
        let mut tx = self.pool.begin().await?;
        let status = Self::refresh_status(&mut *tx).await?;
        tx.commit().await?;
        Ok(status)
    }

    async fn status(&self) -> Result<SyncStatusSnapshot, AppError> {
        let mut conn = self.pool.acquire().await?;
        let (pending_count, dead_letter_count) = Self::live_counts(&mut *conn).await?;
        let last_sync: Option<(Option<i64>,)> =
            sqlx::query_as("SELECT last_sync FROM sync_status_meta WHERE id = 1")
                .fetch_optional(&mut *conn)
                .await?;

        mappers::status_from_row(SyncStatusRow {
            last_sync: last_sync.and_then(|(value,)| value),
            pending_count,
            dead_letter_count,
        })
    }
}
