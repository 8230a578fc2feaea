pub mod custody_log_draft;
pub mod evidence_bag_draft;
pub mod pending_record;
pub mod photo_draft;
pub mod sync_report;
pub mod sync_status;

pub use custody_log_draft::CustodyLogDraft;
pub use evidence_bag_draft::{DEFAULT_BAG_STATUS, EvidenceBagDraft};
pub use pending_record::{PendingDraft, PendingRecord};
pub use photo_draft::PhotoDraft;
pub use sync_report::SyncReport;
pub use sync_status::SyncStatusSnapshot;
