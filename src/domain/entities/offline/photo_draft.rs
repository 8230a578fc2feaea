use crate::domain::value_objects::BagReference;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Photo metadata plus the binary itself. The binary lives in its own storage
/// column, so it is skipped when the metadata is serialized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDraft {
    pub bag_id: BagReference,
    pub file_name: String,
    pub content_type: String,
    pub notes: Option<String>,
    /// Lowercase hex sha-256 of `content`.
    pub digest: String,
    #[serde(skip)]
    pub content: Bytes,
}

impl PhotoDraft {
    pub fn size(&self) -> usize {
        self.content.len()
    }
}
