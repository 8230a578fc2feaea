pub mod mock_remote;
pub mod recording_notifier;

pub use mock_remote::*;
pub use recording_notifier::*;
