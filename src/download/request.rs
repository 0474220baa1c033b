//! Download requests and their identifiers.

use std::fmt;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use url::Url;

use super::constants::PARTIAL_EXTENSION;
use super::error::DownloadError;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier tagging every event of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One transfer: where to fetch from and where to save to.
///
/// Requests are plain values. Nothing is validated until the transfer runs, so
/// a bad locator or destination surfaces as a failed outcome rather than a
/// constructor error.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    id: RequestId,
    url: String,
    save_path: PathBuf,
}

impl DownloadRequest {
    /// Creates a request with a fresh [`RequestId`].
    pub fn new(url: impl Into<String>, save_path: impl Into<PathBuf>) -> Self {
        Self {
            id: RequestId::next(),
            url: url.into(),
            save_path: save_path.into(),
        }
    }

    /// Identifier carried by this request's events.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// The remote locator as given by the caller.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The destination path as given by the caller.
    #[must_use]
    pub fn save_path(&self) -> &Path {
        &self.save_path
    }

    /// Parses the locator, accepting only http(s) URLs with a host.
    pub(crate) fn parse_url(&self) -> Result<Url, DownloadError> {
        if self.url.trim().is_empty() {
            return Err(DownloadError::invalid_url(&self.url, "locator is empty"));
        }
        let parsed =
            Url::parse(&self.url).map_err(|e| DownloadError::invalid_url(&self.url, e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DownloadError::invalid_url(
                &self.url,
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(DownloadError::invalid_url(&self.url, "missing host"));
        }
        Ok(parsed)
    }

    /// Returns the sibling path bytes are streamed into before the final rename.
    ///
    /// The name embeds the request id so concurrent requests for the same
    /// destination never share a partial file.
    pub(crate) fn partial_path(&self) -> Result<PathBuf, DownloadError> {
        if self.save_path.as_os_str().is_empty() {
            return Err(DownloadError::invalid_save_path(
                &self.save_path,
                "path is empty",
            ));
        }
        if self
            .save_path
            .to_string_lossy()
            .ends_with(['/', MAIN_SEPARATOR])
        {
            return Err(DownloadError::invalid_save_path(
                &self.save_path,
                "path ends with a separator",
            ));
        }
        let Some(file_name) = self.save_path.file_name() else {
            return Err(DownloadError::invalid_save_path(
                &self.save_path,
                "path does not name a file",
            ));
        };

        let mut partial = file_name.to_os_string();
        partial.push(format!(".{}.{PARTIAL_EXTENSION}", self.id));
        Ok(self.save_path.with_file_name(partial))
    }
}
