use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::relay::{CompletionCallback, CompletionRelay, ACTION_DOWNLOAD_COMPLETE};
use crate::service::fetch::fetch_to_part_file;
use crate::service::handle::{DownloadHandle, DownloadState};
use crate::types::types::{DownloadConfig, DownloadError, DownloadStatus};

/// Suffix of the in-flight temp file written next to the destination.
const PART_FILE_SUFFIX: &str = ".part";

/// Runs downloads and dispatches the completion broadcast.
///
/// Every download started here transfers into `<base_dir>/<file_path>.part`
/// and is renamed onto the destination once the body is fully written. When
/// a download reaches a terminal state, naturally finished or failed, the
/// service dispatches `ACTION_DOWNLOAD_COMPLETE` through its relay; a
/// cancelled download is removed without a broadcast.
///
/// At most one live download per destination path; the slot frees up when
/// that download reaches a terminal state.
pub struct DownloadService {
    base_dir: PathBuf,
    client: Client,
    relay: Arc<CompletionRelay>,
    active: Arc<Mutex<HashMap<PathBuf, DownloadHandle>>>,
}

impl DownloadService {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            // Tuned HTTP client: connection timeout, TCP optimizations
            client: Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .tcp_nodelay(true)
                .build()
                .expect("failed to build HTTP client"),
            relay: Arc::new(CompletionRelay::new()),
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register the completion callback with the relay, replacing any
    /// previously registered one.
    pub fn set_completion_callback(&self, callback: Arc<dyn CompletionCallback>) {
        self.relay.set_callback(callback);
    }

    /// The relay completion broadcasts are dispatched through.
    pub fn relay(&self) -> &Arc<CompletionRelay> {
        &self.relay
    }

    /// Handles for the currently live downloads.
    pub fn downloads(&self) -> Vec<DownloadHandle> {
        self.active.lock().unwrap().values().cloned().collect()
    }

    /// Start a download.
    ///
    /// The destination must be a relative path and must not already have a
    /// live download; a stale destination or part file from an earlier run
    /// is deleted before the transfer begins.
    pub async fn start(
        &self,
        mut config: DownloadConfig,
    ) -> Result<DownloadHandle, DownloadError> {
        if config.file_path.is_absolute() {
            return Err(DownloadError::InvalidDestination(
                config.file_path.display().to_string(),
            ));
        }
        config.policy = config.policy.normalized();

        let dest_path = self.base_dir.join(&config.file_path);
        let part_path = {
            let mut path = dest_path.clone().into_os_string();
            path.push(PART_FILE_SUFFIX);
            PathBuf::from(path)
        };

        log::info!(
            "starting download of {} to {} (policy {:?})",
            config.url,
            dest_path.display(),
            config.policy
        );

        let config = Arc::new(config);
        let (state_tx, state_rx) = watch::channel(DownloadState::downloading());
        let cancel_token = CancellationToken::new();
        let handle = DownloadHandle::new(
            Arc::clone(&config),
            state_rx,
            cancel_token.clone(),
        );

        // Claim the destination slot before touching the filesystem.
        {
            let mut active = self.active.lock().unwrap();
            if active.contains_key(&dest_path) {
                return Err(DownloadError::DuplicateDestination(
                    config.file_path.display().to_string(),
                ));
            }
            active.insert(dest_path.clone(), handle.clone());
        }

        if let Err(e) = prepare_destination(&dest_path, &part_path).await {
            self.active.lock().unwrap().remove(&dest_path);
            return Err(e);
        }

        let client = self.client.clone();
        let relay = Arc::clone(&self.relay);
        let active = Arc::clone(&self.active);
        tokio::spawn(async move {
            let result = run_transfer(&client, &config, &dest_path, &part_path, &cancel_token).await;

            let (status, error, broadcast) = match &result {
                Ok(()) => (DownloadStatus::Done, None, true),
                // User-initiated abort; the host fires no completion
                // broadcast for a removed download.
                Err(DownloadError::Cancelled) => {
                    (DownloadStatus::Failed, Some("Aborted".to_string()), false)
                }
                Err(e) => (DownloadStatus::Failed, Some(e.to_string()), true),
            };

            if status == DownloadStatus::Failed {
                if let Err(e) = remove_if_present(&part_path).await {
                    log::warn!(
                        "failed to clean up part file {}: {}",
                        part_path.display(),
                        e
                    );
                }
                log::warn!(
                    "download of {} failed: {}",
                    config.url,
                    error.as_deref().unwrap_or("unknown error")
                );
            }

            // Free the destination slot and publish the terminal state
            // before broadcasting, so a callback observes the download as
            // finished and may reuse the destination.
            active.lock().unwrap().remove(&dest_path);
            let _ = state_tx.send(DownloadState { status, error });

            if broadcast {
                relay.on_broadcast(ACTION_DOWNLOAD_COMPLETE);
            }
        });

        Ok(handle)
    }
}

/// Delete stale destination and part files and make sure the parent
/// directory exists.
async fn prepare_destination(dest_path: &Path, part_path: &Path) -> Result<(), DownloadError> {
    remove_if_present(dest_path)
        .await
        .map_err(DownloadError::Disk)?;
    remove_if_present(part_path)
        .await
        .map_err(DownloadError::Disk)?;
    if let Some(parent) = dest_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(DownloadError::Disk)?;
    }
    Ok(())
}

async fn remove_if_present(path: &Path) -> Result<(), std::io::Error> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            log::debug!("removed stale file {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Fetch into the part file, then rename onto the destination.
async fn run_transfer(
    client: &Client,
    config: &DownloadConfig,
    dest_path: &Path,
    part_path: &Path,
    cancel_token: &CancellationToken,
) -> Result<(), DownloadError> {
    let bytes = fetch_to_part_file(client, config, part_path, cancel_token).await?;
    tokio::fs::rename(part_path, dest_path)
        .await
        .map_err(DownloadError::Disk)?;
    log::info!("downloaded {} bytes to {}", bytes, dest_path.display());
    Ok(())
}
