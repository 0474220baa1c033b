//! Error types for the download module.
//!
//! Every failure a transfer can hit is a [`DownloadError`] variant carrying the
//! URL or path it happened on. Callers branch on [`DownloadError::kind`] rather
//! than on message text.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a failed download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The locator is malformed, or its host could not be resolved or connected.
    Resolution,
    /// The connection dropped, timed out or ended early after it was established.
    Transport,
    /// The server answered with a non-success status.
    RemoteStatus,
    /// The local filesystem rejected the write.
    LocalWrite,
}

impl ErrorKind {
    /// Returns the stable label used in logs and JSON output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolution => "resolution",
            Self::Transport => "transport",
            Self::RemoteStatus => "remote_status",
            Self::LocalWrite => "local_write",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during a file download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The locator is empty, unparsable, or not an http(s) URL with a host.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected locator.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// DNS resolution or connection establishment failed.
    #[error("cannot connect to {url}: {source}")]
    Connect {
        /// The URL that could not be reached.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The server stopped sending data for longer than the read timeout.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The connection failed after it was established.
    #[error("transfer of {url} failed: {source}")]
    Transport {
        /// The URL being transferred.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The body length disagrees with the advertised Content-Length.
    #[error("transfer of {url} ended with {received} of {expected} bytes")]
    LengthMismatch {
        /// The URL being transferred.
        url: String,
        /// Advertised length in bytes.
        expected: u64,
        /// Bytes actually received.
        received: u64,
    },

    /// The transfer task ended without producing an outcome.
    #[error("transfer of {url} was aborted before completion")]
    Aborted {
        /// The URL being transferred.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The destination path cannot name a file.
    #[error("invalid save path '{path}': {reason}")]
    InvalidSavePath {
        /// The rejected destination.
        path: PathBuf,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// File system error while writing the download.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Returns the classification callers branch on.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. } | Self::Connect { .. } => ErrorKind::Resolution,
            Self::Timeout { .. }
            | Self::Transport { .. }
            | Self::LengthMismatch { .. }
            | Self::Aborted { .. } => ErrorKind::Transport,
            Self::HttpStatus { .. } => ErrorKind::RemoteStatus,
            Self::InvalidSavePath { .. } | Self::Io { .. } => ErrorKind::LocalWrite,
        }
    }

    /// Classifies an error returned while sending the request.
    ///
    /// Connect failures (including connect timeouts) mean the locator was
    /// unreachable; anything else happened on an established connection.
    pub fn from_request(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_builder() {
            Self::InvalidUrl {
                reason: source.to_string(),
                url,
            }
        } else if source.is_connect() {
            Self::Connect { url, source }
        } else if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Transport { url, source }
        }
    }

    /// Classifies an error raised while reading the response body.
    pub fn from_body(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Transport {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a length mismatch error.
    pub fn length_mismatch(url: impl Into<String>, expected: u64, received: u64) -> Self {
        Self::LengthMismatch {
            url: url.into(),
            expected,
            received,
        }
    }

    /// Creates an aborted-transfer error.
    pub fn aborted(url: impl Into<String>) -> Self {
        Self::Aborted { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid save path error.
    pub fn invalid_save_path(path: impl Into<PathBuf>, reason: &'static str) -> Self {
        Self::InvalidSavePath {
            path: path.into(),
            reason,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path the source error lacks.

/// Errors raised while constructing a [`Downloader`](super::Downloader).
#[derive(Debug, Error)]
pub enum SetupError {
    /// The HTTP client could not be built from the configuration.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// No Tokio runtime is available to run transfers on.
    #[error("no Tokio runtime available; create the downloader inside a runtime")]
    NoRuntime,
}
