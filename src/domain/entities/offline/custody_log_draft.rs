use crate::domain::value_objects::{BagReference, CustodyAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustodyLogDraft {
    pub bag_id: BagReference,
    pub action: CustodyAction,
    pub performed_by: String,
    pub performed_at: DateTime<Utc>,
    pub location: Option<String>,
    pub notes: Option<String>,
}
