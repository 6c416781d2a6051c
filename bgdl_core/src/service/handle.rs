use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::types::types::{DownloadConfig, DownloadStatus};

/// Terminal state of one download, published by the transfer task.
#[derive(Debug, Clone)]
pub(crate) struct DownloadState {
    pub(crate) status: DownloadStatus,
    pub(crate) error: Option<String>,
}

impl DownloadState {
    pub(crate) fn downloading() -> Self {
        Self {
            status: DownloadStatus::Downloading,
            error: None,
        }
    }
}

/// A download handed out by `DownloadService::start`.
///
/// Cheap to clone; all clones observe the same download.
#[derive(Clone)]
pub struct DownloadHandle {
    config: Arc<DownloadConfig>,
    state: watch::Receiver<DownloadState>,
    cancel: CancellationToken,
}

impl DownloadHandle {
    pub(crate) fn new(
        config: Arc<DownloadConfig>,
        state: watch::Receiver<DownloadState>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            state,
            cancel,
        }
    }

    /// The configuration this download was started with.
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    pub fn status(&self) -> DownloadStatus {
        self.state.borrow().status
    }

    /// Error message for a failed download.
    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Wait until the download leaves the `Downloading` state and return the
    /// terminal status.
    pub async fn finished(&self) -> DownloadStatus {
        let mut state = self.state.clone();
        loop {
            let status = state.borrow().status;
            if status != DownloadStatus::Downloading {
                return status;
            }
            if state.changed().await.is_err() {
                return state.borrow().status;
            }
        }
    }

    /// Abort the download if it is still in progress. The status becomes
    /// `Failed` with the error set to `"Aborted"`; a finished download is
    /// unaffected.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}
