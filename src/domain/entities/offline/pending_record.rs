use super::{CustodyLogDraft, EvidenceBagDraft, PhotoDraft};
use crate::domain::value_objects::{BagReference, PendingRecordId, RecordKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PendingDraft {
    EvidenceBag(EvidenceBagDraft),
    CustodyLog(CustodyLogDraft),
    Photo(PhotoDraft),
}

impl PendingDraft {
    pub fn kind(&self) -> RecordKind {
        match self {
            PendingDraft::EvidenceBag(_) => RecordKind::EvidenceBag,
            PendingDraft::CustodyLog(_) => RecordKind::CustodyLog,
            PendingDraft::Photo(_) => RecordKind::Photo,
        }
    }

    /// The bag a dependent draft points at. Bags themselves have none.
    pub fn bag_reference(&self) -> Option<&BagReference> {
        match self {
            PendingDraft::EvidenceBag(_) => None,
            PendingDraft::CustodyLog(draft) => Some(&draft.bag_id),
            PendingDraft::Photo(draft) => Some(&draft.bag_id),
        }
    }
}

impl From<EvidenceBagDraft> for PendingDraft {
    fn from(draft: EvidenceBagDraft) -> Self {
        PendingDraft::EvidenceBag(draft)
    }
}

impl From<CustodyLogDraft> for PendingDraft {
    fn from(draft: CustodyLogDraft) -> Self {
        PendingDraft::CustodyLog(draft)
    }
}

impl From<PhotoDraft> for PendingDraft {
    fn from(draft: PhotoDraft) -> Self {
        PendingDraft::Photo(draft)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRecord {
    pub id: PendingRecordId,
    pub payload: PendingDraft,
    pub timestamp: DateTime<Utc>,
    pub synced: bool,
    pub retry_count: u32,
    pub dead_lettered: bool,
    pub last_error: Option<String>,
}

impl PendingRecord {
    pub fn kind(&self) -> RecordKind {
        self.payload.kind()
    }
}
