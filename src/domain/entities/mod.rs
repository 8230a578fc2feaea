pub mod offline;

pub use offline::{
    CustodyLogDraft, EvidenceBagDraft, PendingDraft, PendingRecord, PhotoDraft, SyncReport,
    SyncStatusSnapshot,
};
