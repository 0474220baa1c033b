//! HTTP client wrapper that streams one response body to one file.
//!
//! Bytes go into a uniquely named partial file next to the destination and are
//! moved into place only after the body is complete, flushed and synced. Every
//! failure path removes the partial file, so the destination either holds a
//! complete download or whatever it held before.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::{Client, Response};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::constants::{CONNECT_TIMEOUT, READ_TIMEOUT, WRITE_BUFFER_BYTES};
use super::error::{DownloadError, SetupError};
use super::progress::{ProgressSample, ProgressTracker};
use super::request::DownloadRequest;
use super::state::DownloadState;
use crate::user_agent;

/// Transport settings shared by every request of a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Limit for DNS resolution plus TCP/TLS connection setup.
    pub connect_timeout: Duration,
    /// Limit for the gap between two reads of the response.
    pub read_timeout: Duration,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
            user_agent: user_agent::default_download_user_agent(),
        }
    }
}

/// HTTP client for downloading files with streaming support.
///
/// Create once and clone freely; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client with [`ClientConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Client`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, SetupError> {
        Self::from_config(&ClientConfig::default())
    }

    /// Creates a client from explicit settings.
    ///
    /// Content decoding is left off so the file receives the bytes exactly as
    /// sent and progress counts match the advertised length.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Client`] if the builder rejects the settings.
    pub fn from_config(config: &ClientConfig) -> Result<Self, SetupError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|source| SetupError::Client { source })?;
        Ok(Self { client })
    }

    /// Downloads `request` to its save path, reporting each written chunk.
    ///
    /// `state` moves from `Pending` to `InFlight` once a success response is
    /// accepted; the caller owns the terminal transition.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - the URL is invalid or the host cannot be reached
    /// - the server returns a non-success status
    /// - the connection fails or stalls mid-body, or the body is short
    /// - the partial file cannot be created, written or moved into place
    #[instrument(skip(self, request, state, on_progress), fields(id = %request.id(), url = %request.url()))]
    pub async fn download_to_path<F>(
        &self,
        request: &DownloadRequest,
        state: &mut DownloadState,
        mut on_progress: F,
    ) -> Result<PathBuf, DownloadError>
    where
        F: FnMut(ProgressSample),
    {
        debug!("starting download");

        let parsed_url = request.parse_url()?;
        let partial_path = request.partial_path()?;
        let save_path = request.save_path();
        reject_directory_destination(save_path).await?;

        // Opened before the request so an unwritable destination is reported
        // as such whatever the server would have answered.
        let file = File::create(&partial_path)
            .await
            .map_err(|e| DownloadError::io(partial_path.clone(), e))?;
        debug!(partial = %partial_path.display(), "opened partial file");

        let result = match self
            .transfer(request.url(), parsed_url, file, &partial_path, state, &mut on_progress)
            .await
        {
            Ok(bytes) => promote(&partial_path, save_path).await.map(|()| bytes),
            Err(error) => Err(error),
        };

        match result {
            Ok(bytes) => {
                info!(path = %save_path.display(), bytes, "download complete");
                Ok(save_path.to_path_buf())
            }
            Err(error) => {
                discard_partial(&partial_path).await;
                Err(error)
            }
        }
    }

    /// Sends the request and streams the body. The file and the response are
    /// both dropped before this returns.
    async fn transfer<F>(
        &self,
        url: &str,
        parsed_url: Url,
        file: File,
        partial_path: &Path,
        state: &mut DownloadState,
        on_progress: &mut F,
    ) -> Result<u64, DownloadError>
    where
        F: FnMut(ProgressSample),
    {
        let response = self.send_request(url, parsed_url).await?;
        let total = response.content_length();

        state.transition(DownloadState::InFlight);
        debug!(status = response.status().as_u16(), ?total, "response accepted");

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| DownloadError::from_body(url, e)));
        write_body(body, total, file, partial_path, url, on_progress).await
    }

    async fn send_request(&self, url: &str, parsed_url: Url) -> Result<Response, DownloadError> {
        let response = self
            .client
            .get(parsed_url)
            .send()
            .await
            .map_err(|e| DownloadError::from_request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "server rejected request");
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }

}

/// Streams `body` into `file`, returning the number of bytes written.
///
/// The writer is flushed and the file synced before returning, and a known
/// `total` must be matched exactly.
pub(crate) async fn write_body<S, F>(
    body: S,
    total: Option<u64>,
    file: File,
    path: &Path,
    url: &str,
    on_progress: &mut F,
) -> Result<u64, DownloadError>
where
    S: Stream<Item = Result<Bytes, DownloadError>>,
    F: FnMut(ProgressSample),
{
    let mut body = std::pin::pin!(body);
    let mut tracker = ProgressTracker::new(total);
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_BYTES, file);

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        let sample = tracker
            .record(chunk.len())
            .map_err(|overrun| DownloadError::length_mismatch(url, overrun.expected, overrun.received))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path, e))?;

        if let Some(sample) = sample {
            on_progress(sample);
        }
    }

    if tracker.is_short() {
        return Err(DownloadError::length_mismatch(
            url,
            tracker.total().unwrap_or_default(),
            tracker.transferred(),
        ));
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(path, e))?;
    writer
        .into_inner()
        .sync_all()
        .await
        .map_err(|e| DownloadError::io(path, e))?;

    Ok(tracker.transferred())
}

/// Fails when the destination already exists as a directory, which the final
/// rename could never replace.
async fn reject_directory_destination(save_path: &Path) -> Result<(), DownloadError> {
    match tokio::fs::metadata(save_path).await {
        Ok(meta) if meta.is_dir() => Err(DownloadError::invalid_save_path(
            save_path,
            "path is a directory",
        )),
        _ => Ok(()),
    }
}

/// Moves the finished partial file onto the destination, replacing it.
async fn promote(partial_path: &Path, save_path: &Path) -> Result<(), DownloadError> {
    tokio::fs::rename(partial_path, save_path)
        .await
        .map_err(|e| DownloadError::io(save_path, e))
}

async fn discard_partial(partial_path: &Path) {
    match tokio::fs::remove_file(partial_path).await {
        Ok(()) => debug!(path = %partial_path.display(), "removed partial file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            path = %partial_path.display(),
            error = %e,
            "failed to remove partial file"
        ),
    }
}
