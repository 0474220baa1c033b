//! Non-blocking download front end.
//!
//! Each request runs on its own Tokio task spawned onto the runtime the
//! [`Downloader`] was created in. That task is the execution context of every
//! callback for the request: progress calls and the completion call all run
//! there, in order, never on the caller's thread. Requests share nothing but
//! the client's connection pool and configuration.

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info_span, warn};

use super::client::{ClientConfig, HttpClient};
use super::error::SetupError;
use super::observer::{
    CallbackObserver, ChannelObserver, DownloadEvent, DownloadHandle, DownloadObserver,
    DownloadOutcome,
};
use super::progress::ProgressSample;
use super::request::{DownloadRequest, RequestId};
use super::state::DownloadState;

/// Starts downloads without blocking the caller.
///
/// There is no limit on concurrent requests, no deduplication and no
/// cancellation: a started request always runs to `Succeeded` or `Failed`.
///
/// # Example
///
/// ```no_run
/// use fetchfile_core::download::{ClientConfig, Downloader};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let downloader = Downloader::new(&ClientConfig::default())?;
/// let (done_tx, done_rx) = tokio::sync::oneshot::channel();
/// downloader.download(
///     "https://example.com/file.zip",
///     "/tmp/file.zip",
///     |sample| println!("{} / {:?}", sample.transferred, sample.total),
///     move |outcome| {
///         let _ = done_tx.send(outcome);
///     },
/// );
/// let saved = done_rx.await?.into_result()?;
/// println!("saved to {}", saved.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Downloader {
    client: HttpClient,
    runtime: Handle,
}

impl Downloader {
    /// Creates a downloader bound to the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::NoRuntime`] outside a runtime, or
    /// [`SetupError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, SetupError> {
        let runtime = Handle::try_current().map_err(|_| SetupError::NoRuntime)?;
        Ok(Self::with_runtime(HttpClient::from_config(config)?, runtime))
    }

    /// Creates a downloader from an existing client and runtime handle.
    #[must_use]
    pub fn with_runtime(client: HttpClient, runtime: Handle) -> Self {
        Self { client, runtime }
    }

    /// Downloads `download_path` to `save_path`, reporting through closures.
    ///
    /// Returns immediately. `on_progress` runs zero or more times, then
    /// `on_complete` runs exactly once, both on the request's task.
    pub fn download<P, C>(&self, download_path: &str, save_path: &str, on_progress: P, on_complete: C)
    where
        P: FnMut(ProgressSample) + Send + 'static,
        C: FnOnce(DownloadOutcome) + Send + 'static,
    {
        self.download_request(
            DownloadRequest::new(download_path, save_path),
            CallbackObserver::new(on_progress, on_complete),
        );
    }

    /// Runs `request`, reporting to `observer`. Returns immediately.
    pub fn download_request<O>(&self, request: DownloadRequest, observer: O)
    where
        O: DownloadObserver,
    {
        let span = info_span!("download", id = %request.id(), url = %request.url());
        let client = self.client.clone();
        self.runtime
            .spawn(run_request(client, request, observer).instrument(span));
    }

    /// Runs `request` and returns a handle receiving its events.
    #[must_use = "the handle is the only way to observe this request"]
    pub fn start(&self, request: DownloadRequest) -> DownloadHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let handle = DownloadHandle::new(request.id(), request.url().to_owned(), events_rx);
        self.start_into(request, events_tx);
        handle
    }

    /// Runs `request`, sending its events into a channel that may be shared
    /// with other requests. Events carry the returned id.
    pub fn start_into(
        &self,
        request: DownloadRequest,
        events: mpsc::UnboundedSender<DownloadEvent>,
    ) -> RequestId {
        let id = request.id();
        self.download_request(request, ChannelObserver::new(id, events));
        id
    }
}

/// Drives one request from `Pending` to a terminal state and delivers the
/// outcome. The observer is consumed by the completion call.
async fn run_request<O>(client: HttpClient, request: DownloadRequest, mut observer: O)
where
    O: DownloadObserver,
{
    let mut state = DownloadState::Pending;
    let result = client
        .download_to_path(&request, &mut state, |sample| observer.on_progress(sample))
        .await;

    let outcome = match result {
        Ok(path) => {
            let moved = state.transition(DownloadState::Succeeded);
            debug_assert!(moved, "success must pass through InFlight");
            DownloadOutcome::Saved(path)
        }
        Err(error) => {
            state.transition(DownloadState::Failed);
            warn!(kind = %error.kind(), error = %error, "download failed");
            DownloadOutcome::Failed(error)
        }
    };

    debug!(?state, "delivering outcome");
    observer.on_complete(outcome);
}
