pub mod evidence_remote;
pub mod offline_queue;
pub mod sync_notifier;
pub mod sync_trigger;

pub use evidence_remote::{EvidenceRemote, RemoteError, StoredPhoto};
pub use offline_queue::OfflineQueue;
pub use sync_notifier::{SyncNotifier, TracingNotifier};
pub use sync_trigger::SyncTrigger;
