pub mod offline_service;
pub mod status_monitor;
pub mod sync_service;

pub use offline_service::{
    NewCustodyEntry, NewEvidenceBag, NewPhoto, OfflineService, OfflineServiceTrait,
};
pub use status_monitor::{SyncStatusMonitor, SyncStatusView};
pub use sync_service::SyncService;
