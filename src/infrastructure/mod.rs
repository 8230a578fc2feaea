pub mod asset_cache;
pub mod network;
pub mod offline;
