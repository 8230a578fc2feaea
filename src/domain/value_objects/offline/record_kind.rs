use serde::{Deserialize, Serialize};
use std::fmt;

/// Partition of the local queue. Sync cycles drain kinds in `RecordKind::SYNC_ORDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    EvidenceBag,
    CustodyLog,
    Photo,
}

impl RecordKind {
    pub const SYNC_ORDER: [RecordKind; 3] =
        [RecordKind::EvidenceBag, RecordKind::CustodyLog, RecordKind::Photo];

    pub fn partition(&self) -> &'static str {
        match self {
            RecordKind::EvidenceBag => "pendingEvidenceBags",
            RecordKind::CustodyLog => "pendingCustodyLogs",
            RecordKind::Photo => "pendingPhotos",
        }
    }

    pub fn id_prefix(&self) -> &'static str {
        match self {
            RecordKind::EvidenceBag => "bag",
            RecordKind::CustodyLog => "custody",
            RecordKind::Photo => "photo",
        }
    }

    pub fn from_id_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "bag" => Some(RecordKind::EvidenceBag),
            "custody" => Some(RecordKind::CustodyLog),
            "photo" => Some(RecordKind::Photo),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.partition())
    }
}
