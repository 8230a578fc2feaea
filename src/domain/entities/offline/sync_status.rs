use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived queue summary. `last_sync` is refreshed on every queue mutation,
/// so it reads as "last queue activity" rather than "last successful push".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusSnapshot {
    pub last_sync: Option<DateTime<Utc>>,
    pub pending_count: u32,
    pub dead_letter_count: u32,
}

impl SyncStatusSnapshot {
    pub fn has_stuck_items(&self) -> bool {
        self.dead_letter_count > 0
    }
}
