pub mod connectivity;

pub use connectivity::{
    ConnectivitySignal, ConnectivityTransition, ConnectivityWatcher, WatcherHandle,
};
