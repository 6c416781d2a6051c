pub mod callback;
pub mod completion_relay;

pub use callback::CompletionCallback;
pub use completion_relay::{is_download_complete, CompletionRelay, ACTION_DOWNLOAD_COMPLETE};
