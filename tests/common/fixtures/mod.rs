#![allow(dead_code)]

use bytes::Bytes;
use chrono::Utc;
use evidence_offline::domain::entities::offline::{
    CustodyLogDraft, EvidenceBagDraft, PendingDraft, PhotoDraft,
};
use evidence_offline::domain::value_objects::{BagReference, CustodyAction, PendingRecordId};
use sha2::{Digest, Sha256};

pub fn bag(display_id: &str) -> PendingDraft {
    PendingDraft::EvidenceBag(EvidenceBagDraft {
        display_id: display_id.to_string(),
        bag_type: "narcotics".into(),
        description: "Sealed pouch, white powder".into(),
        collected_by: "officer-7".into(),
        location: "Evidence room A".into(),
        notes: Some("photographed at scene".into()),
        status: "collected".into(),
    })
}

pub fn local_ref(id: &PendingRecordId) -> BagReference {
    BagReference::from(id)
}

pub fn remote_ref(id: &str) -> BagReference {
    BagReference::new(id.to_string()).unwrap()
}

pub fn custody(bag_id: BagReference, performed_by: &str) -> PendingDraft {
    PendingDraft::CustodyLog(CustodyLogDraft {
        bag_id,
        action: CustodyAction::Transferred,
        performed_by: performed_by.to_string(),
        performed_at: Utc::now(),
        location: Some("Lab intake".into()),
        notes: None,
    })
}

pub fn photo(bag_id: BagReference, file_name: &str, content: &'static [u8]) -> PendingDraft {
    PendingDraft::Photo(PhotoDraft {
        bag_id,
        file_name: file_name.to_string(),
        content_type: "image/jpeg".into(),
        notes: None,
        digest: format!("{:x}", Sha256::digest(content)),
        content: Bytes::from_static(content),
    })
}
