use async_trait::async_trait;
use evidence_offline::application::ports::{EvidenceRemote, RemoteError, StoredPhoto};
use evidence_offline::domain::entities::offline::{CustodyLogDraft, EvidenceBagDraft, PhotoDraft};
use evidence_offline::domain::value_objects::RemoteBagId;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    CreateBag { display_id: String },
    AppendCustody { bag_id: String, performed_by: String },
    UploadPhoto { bag_id: String, file_name: String },
    InsertPhoto { bag_id: String, path: String },
}

/// In-memory remote that records every call and fails the ones it is told to.
/// Failure keys are the bag display id, the custody performer, or the photo
/// file name.
pub struct ScriptedRemote {
    calls: Mutex<Vec<RemoteCall>>,
    failures: Mutex<HashMap<String, RemoteError>>,
    photo_record_failures: Mutex<HashMap<String, RemoteError>>,
    next_bag_id: AtomicU32,
    offline: AtomicBool,
}

#[allow(dead_code)]
impl ScriptedRemote {
    pub fn new() -> Self {
        Self::starting_at(42)
    }

    pub fn starting_at(first_bag_id: u32) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            photo_record_failures: Mutex::new(HashMap::new()),
            next_bag_id: AtomicU32::new(first_bag_id),
            offline: AtomicBool::new(false),
        }
    }

    pub fn fail(&self, key: &str, error: RemoteError) {
        self.failures
            .lock()
            .unwrap()
            .insert(key.to_string(), error);
    }

    /// Lets the binary upload through and rejects the metadata insert.
    pub fn fail_photo_record(&self, file_name: &str, error: RemoteError) {
        self.photo_record_failures
            .lock()
            .unwrap()
            .insert(file_name.to_string(), error);
    }

    pub fn heal(&self, key: &str) {
        self.failures.lock().unwrap().remove(key);
        self.photo_record_failures.lock().unwrap().remove(key);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RemoteCall::CreateBag { .. }))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, key: &str) -> Result<(), RemoteError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("connection refused".into()));
        }
        match self.failures.lock().unwrap().get(key) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EvidenceRemote for ScriptedRemote {
    async fn create_evidence_bag(
        &self,
        draft: &EvidenceBagDraft,
    ) -> Result<RemoteBagId, RemoteError> {
        self.record(RemoteCall::CreateBag {
            display_id: draft.display_id.clone(),
        });
        self.check(&draft.display_id)?;
        let id = self.next_bag_id.fetch_add(1, Ordering::SeqCst);
        Ok(RemoteBagId::new(format!("srv-{id}")).unwrap())
    }

    async fn append_custody_entry(
        &self,
        bag_id: &RemoteBagId,
        draft: &CustodyLogDraft,
    ) -> Result<(), RemoteError> {
        self.record(RemoteCall::AppendCustody {
            bag_id: bag_id.as_str().to_string(),
            performed_by: draft.performed_by.clone(),
        });
        self.check(&draft.performed_by)
    }

    async fn upload_photo_content(
        &self,
        bag_id: &RemoteBagId,
        draft: &PhotoDraft,
    ) -> Result<StoredPhoto, RemoteError> {
        self.record(RemoteCall::UploadPhoto {
            bag_id: bag_id.as_str().to_string(),
            file_name: draft.file_name.clone(),
        });
        self.check(&draft.file_name)?;
        Ok(StoredPhoto {
            path: format!("{}/{}", bag_id.as_str(), draft.file_name),
        })
    }

    async fn insert_photo_record(
        &self,
        bag_id: &RemoteBagId,
        stored: &StoredPhoto,
        draft: &PhotoDraft,
    ) -> Result<(), RemoteError> {
        self.record(RemoteCall::InsertPhoto {
            bag_id: bag_id.as_str().to_string(),
            path: stored.path.clone(),
        });
        match self.photo_record_failures.lock().unwrap().get(&draft.file_name) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
