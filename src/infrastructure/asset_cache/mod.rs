pub mod request;
pub mod storage;
pub mod worker;

pub use request::{
    AssetRequest, AssetResponse, FetchError, RequestClass, RequestDestination, RequestMode,
    ResponseKind,
};
pub use storage::{CacheStorage, MemoryCacheStorage};
pub use worker::{ActivationReport, AssetFetcher, OfflineAssetWorker, CACHE_PREFIX};
