use super::{PendingRecordId, RecordKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identity of an evidence bag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteBagId(String);

impl RemoteBagId {
    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("Remote bag ID cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteBagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RemoteBagId> for String {
    fn from(id: RemoteBagId) -> Self {
        id.0
    }
}

/// The bag a custody entry or photo points at. A draft created while the bag
/// itself was still queued carries the bag's local queue id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BagReference(String);

impl BagReference {
    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("Bag reference cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_local(&self) -> bool {
        PendingRecordId::is_local_for(&self.0, RecordKind::EvidenceBag)
    }

    /// The server id, when the reference never needed resolution.
    pub fn as_remote(&self) -> Option<RemoteBagId> {
        if self.is_local() {
            None
        } else {
            Some(RemoteBagId(self.0.clone()))
        }
    }
}

impl fmt::Display for BagReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<BagReference> for String {
    fn from(value: BagReference) -> Self {
        value.0
    }
}

impl TryFrom<String> for BagReference {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<&PendingRecordId> for BagReference {
    fn from(id: &PendingRecordId) -> Self {
        Self(id.as_str().to_string())
    }
}

impl From<RemoteBagId> for BagReference {
    fn from(id: RemoteBagId) -> Self {
        Self(id.0)
    }
}
