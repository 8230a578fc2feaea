use crate::domain::entities::offline::{CustodyLogDraft, EvidenceBagDraft, PhotoDraft};
use crate::domain::value_objects::RemoteBagId;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Rejected by remote: {0}")]
    Rejected(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Remote call timed out after {0}s")]
    Timeout(u64),

    #[error("Binary storage failed: {0}")]
    Storage(String),
}

/// Location of an uploaded photo binary in remote file storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    pub path: String,
}

/// Remote writes the sync engine replays queued drafts against.
#[async_trait]
pub trait EvidenceRemote: Send + Sync {
    async fn create_evidence_bag(
        &self,
        draft: &EvidenceBagDraft,
    ) -> Result<RemoteBagId, RemoteError>;

    async fn append_custody_entry(
        &self,
        bag_id: &RemoteBagId,
        draft: &CustodyLogDraft,
    ) -> Result<(), RemoteError>;

    /// First half of a photo upload: the binary.
    async fn upload_photo_content(
        &self,
        bag_id: &RemoteBagId,
        draft: &PhotoDraft,
    ) -> Result<StoredPhoto, RemoteError>;

    /// Second half: the metadata row pointing at the stored binary.
    async fn insert_photo_record(
        &self,
        bag_id: &RemoteBagId,
        stored: &StoredPhoto,
        draft: &PhotoDraft,
    ) -> Result<(), RemoteError>;
}
