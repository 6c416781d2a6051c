use std::sync::{Arc, Mutex};

use super::callback::CompletionCallback;

/// Action tag carried by the host's "a download has finished" broadcast.
pub const ACTION_DOWNLOAD_COMPLETE: &str = "bgdl.action.DOWNLOAD_COMPLETE";

/// Whether a broadcast action is the download-complete signal.
///
/// Standalone so the matching rule can be tested apart from the
/// registration glue.
pub fn is_download_complete(action: &str) -> bool {
    action == ACTION_DOWNLOAD_COMPLETE
}

/// Forwards the download service's completion broadcast to a single
/// registered callback.
///
/// The relay holds at most one callback at a time. Registering a new one
/// replaces the previous one, which is never invoked again; there is no
/// unregister. While no callback is registered, broadcasts are dropped
/// silently.
pub struct CompletionRelay {
    callback: Mutex<Option<Arc<dyn CompletionCallback>>>,
}

impl CompletionRelay {
    pub fn new() -> Self {
        Self {
            callback: Mutex::new(None),
        }
    }

    /// Store `callback` as the active handler, replacing any previous one.
    /// Always succeeds; subsequent matching broadcasts route to the new
    /// handler only.
    pub fn set_callback(&self, callback: Arc<dyn CompletionCallback>) {
        let mut slot = self.callback.lock().unwrap();
        *slot = Some(callback);
    }

    /// Deliver a broadcast.
    ///
    /// Invokes the registered callback exactly once if `action` is the
    /// download-complete tag and a callback is present; every other case is
    /// a no-op. Registration state never changes here.
    ///
    /// The slot lock is released before the callback runs, so a callback may
    /// call `set_callback` itself without deadlocking.
    pub fn on_broadcast(&self, action: &str) {
        if !is_download_complete(action) {
            log::debug!("ignoring broadcast with action {:?}", action);
            return;
        }
        let callback = self.callback.lock().unwrap().clone();
        match callback {
            Some(callback) => callback.download_completed(),
            None => log::debug!("download-complete broadcast dropped, no callback registered"),
        }
    }
}

impl Default for CompletionRelay {
    fn default() -> Self {
        Self::new()
    }
}
