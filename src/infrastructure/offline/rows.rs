use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct PendingRecordRow {
    pub id: String,
    pub payload: String,
    pub bag_id: Option<String>,
    pub content: Option<Vec<u8>>,
    pub timestamp: i64,
    pub synced: bool,
    pub retry_count: i64,
    pub dead_letter: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SyncStatusRow {
    pub last_sync: Option<i64>,
    pub pending_count: i64,
    pub dead_letter_count: i64,
}

/// Column values for one insert, produced from a draft.
#[derive(Debug, Clone)]
pub struct PendingRecordInsert {
    pub payload: String,
    pub bag_id: Option<String>,
    pub content: Option<Vec<u8>>,
}

impl PendingRecordInsert {
    pub fn stored_size(&self) -> u64 {
        (self.payload.len() + self.content.as_ref().map_or(0, Vec::len)) as u64
    }
}
