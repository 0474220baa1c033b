//! Asynchronous single-file downloads with progress reporting.
//!
//! A [`Downloader`] takes a URL and a destination path, streams the response
//! body to disk on a background task and reports through a
//! [`DownloadObserver`]: zero or more [`ProgressSample`]s followed by exactly
//! one [`DownloadOutcome`].
//!
//! # Features
//!
//! - Streaming writes (memory use independent of file size)
//! - Atomic placement: bytes land in a `.part` sibling and are renamed on success
//! - Classified failures ([`ErrorKind`]) instead of free-form messages
//! - Callback, observer and channel ([`DownloadEvent`]) delivery styles
//!
//! # Example
//!
//! ```no_run
//! use fetchfile_core::download::{ClientConfig, DownloadRequest, Downloader};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = Downloader::new(&ClientConfig::default())?;
//! let outcome = downloader
//!     .start(DownloadRequest::new("https://example.com/file.zip", "./file.zip"))
//!     .wait()
//!     .await;
//! println!("Downloaded: {}", outcome.into_result()?.display());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod downloader;
mod error;
mod observer;
mod progress;
mod request;
mod state;

pub use client::{ClientConfig, HttpClient};
pub use constants::{CONNECT_TIMEOUT, PARTIAL_EXTENSION, READ_TIMEOUT};
pub use downloader::Downloader;
pub use error::{DownloadError, ErrorKind, SetupError};
pub use observer::{
    CallbackObserver, ChannelObserver, DownloadEvent, DownloadHandle, DownloadObserver,
    DownloadOutcome,
};
pub use progress::ProgressSample;
pub use request::{DownloadRequest, RequestId};
pub use state::DownloadState;

// Per project convention, no module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
