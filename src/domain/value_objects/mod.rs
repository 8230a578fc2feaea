pub mod offline;

pub use offline::{
    BagReference, ConnectivityState, CustodyAction, PendingRecordId, RecordKind, RemoteBagId,
};
