//! Delivery of progress and outcomes to callers.
//!
//! A running transfer reports through a [`DownloadObserver`]. Two observers
//! ship with the crate: [`CallbackObserver`] wraps a pair of closures, and
//! [`ChannelObserver`] forwards [`DownloadEvent`]s into an mpsc channel that a
//! [`DownloadHandle`] (or any shared listener) drains.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

use super::error::DownloadError;
use super::progress::ProgressSample;
use super::request::RequestId;

/// Terminal result of a download request.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// The file was fully written, flushed and moved to this path.
    Saved(PathBuf),
    /// The transfer failed; no file was left at the destination.
    Failed(DownloadError),
}

impl DownloadOutcome {
    /// Path of the saved file, if the download succeeded.
    #[must_use]
    pub fn saved_path(&self) -> Option<&Path> {
        match self {
            Self::Saved(path) => Some(path),
            Self::Failed(_) => None,
        }
    }

    /// The failure, if the download failed.
    #[must_use]
    pub fn error(&self) -> Option<&DownloadError> {
        match self {
            Self::Saved(_) => None,
            Self::Failed(error) => Some(error),
        }
    }

    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    /// Converts into a `Result` for `?`-style callers.
    ///
    /// # Errors
    ///
    /// Returns the contained [`DownloadError`] for failed outcomes.
    pub fn into_result(self) -> Result<PathBuf, DownloadError> {
        match self {
            Self::Saved(path) => Ok(path),
            Self::Failed(error) => Err(error),
        }
    }
}

impl From<Result<PathBuf, DownloadError>> for DownloadOutcome {
    fn from(result: Result<PathBuf, DownloadError>) -> Self {
        match result {
            Ok(path) => Self::Saved(path),
            Err(error) => Self::Failed(error),
        }
    }
}

/// Receives the progress and the single outcome of one request.
///
/// Both methods run on the request's transfer task, never on the caller's
/// context. Progress calls are ordered and all happen before `on_complete`.
/// `on_complete` takes `self` by value, so it can fire at most once.
pub trait DownloadObserver: Send + 'static {
    /// Called after each non-empty chunk is written.
    fn on_progress(&mut self, sample: ProgressSample);

    /// Called exactly once with the terminal outcome.
    fn on_complete(self, outcome: DownloadOutcome)
    where
        Self: Sized;
}

/// Observer built from a progress closure and a completion closure.
pub struct CallbackObserver<P, C> {
    on_progress: P,
    on_complete: C,
}

impl<P, C> CallbackObserver<P, C>
where
    P: FnMut(ProgressSample) + Send + 'static,
    C: FnOnce(DownloadOutcome) + Send + 'static,
{
    pub fn new(on_progress: P, on_complete: C) -> Self {
        Self {
            on_progress,
            on_complete,
        }
    }
}

impl<P, C> DownloadObserver for CallbackObserver<P, C>
where
    P: FnMut(ProgressSample) + Send + 'static,
    C: FnOnce(DownloadOutcome) + Send + 'static,
{
    fn on_progress(&mut self, sample: ProgressSample) {
        (self.on_progress)(sample);
    }

    fn on_complete(self, outcome: DownloadOutcome) {
        (self.on_complete)(outcome);
    }
}

/// Event emitted by a transfer, tagged with its request.
#[derive(Debug)]
pub enum DownloadEvent {
    /// Bytes were written.
    Progress {
        id: RequestId,
        sample: ProgressSample,
    },
    /// The request reached its terminal state. Always the last event.
    Finished {
        id: RequestId,
        outcome: DownloadOutcome,
    },
}

impl DownloadEvent {
    /// The request this event belongs to.
    #[must_use]
    pub fn id(&self) -> RequestId {
        match self {
            Self::Progress { id, .. } | Self::Finished { id, .. } => *id,
        }
    }
}

/// Observer forwarding events into an unbounded channel.
///
/// Send failures are ignored: a receiver that went away does not stop the
/// transfer.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    id: RequestId,
    events: mpsc::UnboundedSender<DownloadEvent>,
}

impl ChannelObserver {
    pub fn new(id: RequestId, events: mpsc::UnboundedSender<DownloadEvent>) -> Self {
        Self { id, events }
    }
}

impl DownloadObserver for ChannelObserver {
    fn on_progress(&mut self, sample: ProgressSample) {
        let _ = self.events.send(DownloadEvent::Progress {
            id: self.id,
            sample,
        });
    }

    fn on_complete(self, outcome: DownloadOutcome) {
        let _ = self.events.send(DownloadEvent::Finished {
            id: self.id,
            outcome,
        });
    }
}

/// Receiving end of a single request started with
/// [`Downloader::start`](super::Downloader::start).
///
/// Dropping the handle does not cancel the transfer.
#[derive(Debug)]
pub struct DownloadHandle {
    id: RequestId,
    url: String,
    events: mpsc::UnboundedReceiver<DownloadEvent>,
}

impl DownloadHandle {
    pub(crate) fn new(
        id: RequestId,
        url: String,
        events: mpsc::UnboundedReceiver<DownloadEvent>,
    ) -> Self {
        Self { id, url, events }
    }

    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Waits for the next event; `None` once the request has finished.
    pub async fn next_event(&mut self) -> Option<DownloadEvent> {
        self.events.recv().await
    }

    /// Discards remaining progress and waits for the outcome.
    ///
    /// If the transfer task vanished without reporting, the outcome is a
    /// transport-kind [`DownloadError::Aborted`].
    pub async fn wait(mut self) -> DownloadOutcome {
        while let Some(event) = self.events.recv().await {
            if let DownloadEvent::Finished { outcome, .. } = event {
                return outcome;
            }
        }
        DownloadOutcome::Failed(DownloadError::aborted(self.url))
    }
}
