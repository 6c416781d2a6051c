use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server responded with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("disk i/o failed: {0}")]
    Disk(std::io::Error),
    #[error("download was cancelled")]
    Cancelled,
    #[error("download of this file is already present: {0}")]
    DuplicateDestination(String),
    #[error("destination path must be relative: {0}")]
    InvalidDestination(String),
    #[error("header name cannot be empty")]
    InvalidHeader,
}

/// Which network types a download may use.
///
/// Carried in the config and logged at start; the in-process engine has no
/// metered transport to enforce it against, so it is informational here the
/// same way some host backends treat it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkPolicy {
    /// Resolves to `AllowMetered` when the download starts.
    #[default]
    Default,
    /// Wi-Fi or similar unlimited connections only.
    UnrestrictedOnly,
    /// Metered connections allowed.
    AllowMetered,
    /// Any connection, including roaming.
    AlwaysAllow,
}

impl NetworkPolicy {
    /// The effective policy once a download starts.
    pub fn normalized(self) -> NetworkPolicy {
        match self {
            NetworkPolicy::Default => NetworkPolicy::AllowMetered,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadStatus {
    Downloading,
    Done,
    Failed,
}

/// Everything needed to perform one download.
///
/// `file_path` must be relative; the final file lands under the service's
/// base directory and is overwritten if it already exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    pub url: String,
    pub file_path: PathBuf,
    pub policy: NetworkPolicy,
    /// Header name to values; a name with several values is sent as several
    /// headers with the same name.
    pub request_headers: HashMap<String, Vec<String>>,
}

impl DownloadConfig {
    pub fn new(url: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            file_path: file_path.into(),
            policy: NetworkPolicy::default(),
            request_headers: HashMap::new(),
        }
    }

    /// Add a single request header. Appends to the value list when called
    /// again with the same name.
    pub fn add_request_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DownloadError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DownloadError::InvalidHeader);
        }
        self.request_headers
            .entry(name)
            .or_default()
            .push(value.into());
        Ok(())
    }
}
