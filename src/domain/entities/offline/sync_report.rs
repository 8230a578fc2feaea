use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub success: u32,
    pub failed: u32,
    /// Records that crossed the retry threshold during this cycle.
    pub dead_lettered: u32,
    /// Unsynced records left after the cycle.
    pub pending_count: u32,
}

impl SyncReport {
    pub fn attempted(&self) -> u32 {
        self.success + self.failed
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}
