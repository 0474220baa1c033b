//! fetchfile core library
//!
//! Downloads one remote resource to one local file without blocking the
//! caller, reporting byte progress and a single classified outcome.
//!
//! # Architecture
//!
//! - [`download`] - request model, HTTP streaming client and the non-blocking
//!   [`Downloader`] front end
//! - [`config`] - optional key = value file supplying client defaults

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use config::{
    ConfigError, FileConfig, LoadedConfig, VerbositySetting, load_config_file,
    load_default_file_config,
};
pub use download::{
    ClientConfig, DownloadError, DownloadEvent, DownloadHandle, DownloadObserver, DownloadOutcome,
    DownloadRequest, DownloadState, Downloader, ErrorKind, HttpClient, ProgressSample, RequestId,
    SetupError,
};
