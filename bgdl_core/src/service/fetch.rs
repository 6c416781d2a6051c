use std::path::Path;

use futures::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::types::types::{DownloadConfig, DownloadError};

/// Applies the config's custom headers to a request builder.
fn apply_headers(
    mut builder: reqwest::RequestBuilder,
    config: &DownloadConfig,
) -> reqwest::RequestBuilder {
    for (name, values) in &config.request_headers {
        for value in values {
            builder = builder.header(name, value);
        }
    }
    builder
}

/// Streams the response body for `config.url` into `part_path`.
///
/// Uses async I/O with a 256 KB write buffer to avoid blocking the tokio
/// runtime. The cancellation token is checked between chunks. One attempt
/// only; the caller decides what a failure means.
pub async fn fetch_to_part_file(
    client: &Client,
    config: &DownloadConfig,
    part_path: &Path,
    cancel_token: &CancellationToken,
) -> Result<u64, DownloadError> {
    if cancel_token.is_cancelled() {
        return Err(DownloadError::Cancelled);
    }

    let builder = apply_headers(client.get(&config.url), config);
    let response = tokio::select! {
        _ = cancel_token.cancelled() => return Err(DownloadError::Cancelled),
        response = builder.send() => response?,
    };

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::HttpStatus(status));
    }

    let file = tokio::fs::File::create(part_path)
        .await
        .map_err(DownloadError::Disk)?;
    let mut writer = tokio::io::BufWriter::with_capacity(256 * 1024, file);
    let mut bytes_written: u64 = 0;

    let mut stream = response.bytes_stream();
    loop {
        let chunk = tokio::select! {
            _ = cancel_token.cancelled() => {
                let _ = writer.flush().await;
                return Err(DownloadError::Cancelled);
            }
            chunk = stream.next() => match chunk {
                Some(chunk) => chunk?,
                None => break,
            },
        };
        writer
            .write_all(&chunk)
            .await
            .map_err(DownloadError::Disk)?;
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(DownloadError::Disk)?;

    log::debug!(
        "[fetch] wrote {} bytes to {}",
        bytes_written,
        part_path.display()
    );

    Ok(bytes_written)
}
