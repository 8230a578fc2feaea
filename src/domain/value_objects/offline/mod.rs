mod bag_reference;
mod connectivity_state;
mod custody_action;
mod pending_record_id;
mod record_kind;

pub use bag_reference::{BagReference, RemoteBagId};
pub use connectivity_state::ConnectivityState;
pub use custody_action::CustodyAction;
pub use pending_record_id::PendingRecordId;
pub use record_kind::RecordKind;
