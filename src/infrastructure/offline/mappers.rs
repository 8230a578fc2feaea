use super::rows::{PendingRecordInsert, PendingRecordRow, SyncStatusRow};
use crate::domain::entities::offline::{
    CustodyLogDraft, EvidenceBagDraft, PendingDraft, PendingRecord, PhotoDraft,
    SyncStatusSnapshot,
};
use crate::domain::value_objects::{PendingRecordId, RecordKind};
use crate::shared::error::AppError;
use bytes::Bytes;
use chrono::{DateTime, Utc};

pub fn insert_from_draft(draft: &PendingDraft) -> Result<PendingRecordInsert, AppError> {
    let insert = match draft {
        PendingDraft::EvidenceBag(bag) => PendingRecordInsert {
            payload: serde_json::to_string(bag)?,
            bag_id: None,
            content: None,
        },
        PendingDraft::CustodyLog(entry) => PendingRecordInsert {
            payload: serde_json::to_string(entry)?,
            bag_id: Some(entry.bag_id.to_string()),
            content: None,
        },
        PendingDraft::Photo(photo) => PendingRecordInsert {
            payload: serde_json::to_string(photo)?,
            bag_id: Some(photo.bag_id.to_string()),
            content: Some(photo.content.to_vec()),
        },
    };
    Ok(insert)
}

pub fn record_from_row(kind: RecordKind, row: PendingRecordRow) -> Result<PendingRecord, AppError> {
    let PendingRecordRow {
        id,
        payload,
        bag_id: _,
        content,
        timestamp,
        synced,
        retry_count,
        dead_letter,
        last_error,
    } = row;

    let payload = match kind {
        RecordKind::EvidenceBag => {
            PendingDraft::EvidenceBag(decode_payload::<EvidenceBagDraft>(&id, &payload)?)
        }
        RecordKind::CustodyLog => {
            PendingDraft::CustodyLog(decode_payload::<CustodyLogDraft>(&id, &payload)?)
        }
        RecordKind::Photo => {
            let mut photo = decode_payload::<PhotoDraft>(&id, &payload)?;
            photo.content = Bytes::from(content.unwrap_or_default());
            PendingDraft::Photo(photo)
        }
    };

    let record_id = PendingRecordId::parse(&id).map_err(AppError::DeserializationError)?;

    Ok(PendingRecord {
        id: record_id,
        payload,
        timestamp: datetime_from_millis(timestamp)?,
        synced,
        retry_count: u32::try_from(retry_count).unwrap_or(u32::MAX),
        dead_lettered: dead_letter,
        last_error,
    })
}

pub fn status_from_row(row: SyncStatusRow) -> Result<SyncStatusSnapshot, AppError> {
    Ok(SyncStatusSnapshot {
        last_sync: row.last_sync.map(datetime_from_millis).transpose()?,
        pending_count: count_to_u32(row.pending_count),
        dead_letter_count: count_to_u32(row.dead_letter_count),
    })
}

pub fn count_to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn decode_payload<T: serde::de::DeserializeOwned>(id: &str, payload: &str) -> Result<T, AppError> {
    serde_json::from_str(payload)
        .map_err(|err| AppError::DeserializationError(format!("record {id}: {err}")))
}

fn datetime_from_millis(value: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::<Utc>::from_timestamp_millis(value)
        .ok_or_else(|| AppError::DeserializationError(format!("invalid timestamp: {value}")))
}
