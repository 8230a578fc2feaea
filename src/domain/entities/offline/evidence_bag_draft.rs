use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_BAG_STATUS: &str = "collected";

/// Everything the remote "create evidence bag" call needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceBagDraft {
    pub display_id: String,
    pub bag_type: String,
    pub description: String,
    pub collected_by: String,
    pub location: String,
    pub notes: Option<String>,
    pub status: String,
}

impl EvidenceBagDraft {
    /// Provisional human-readable identifier for a bag created offline.
    pub fn generate_display_id(now: DateTime<Utc>) -> String {
        let token = Uuid::new_v4().simple().to_string();
        format!(
            "EB-{}-{}",
            now.format("%Y%m%d"),
            token[..6].to_ascii_uppercase()
        )
    }
}
