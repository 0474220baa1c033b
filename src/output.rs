//! Forwarding of download events to the terminal.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use fetchfile_core::{DownloadEvent, DownloadOutcome, ErrorKind, ProgressSample, RequestId};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

const BAR_TEMPLATE: &str =
    "{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "{spinner} {bytes} ({bytes_per_sec})";

/// One JSON line per event in `--json` mode.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub(crate) enum EventLine<'a> {
    Progress {
        id: RequestId,
        #[serde(flatten)]
        sample: ProgressSample,
    },
    Finished {
        id: RequestId,
        saved_path: Option<&'a Path>,
        error: Option<ErrorLine>,
    },
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorLine {
    kind: ErrorKind,
    message: String,
}

impl<'a> EventLine<'a> {
    pub(crate) fn from_event(event: &'a DownloadEvent) -> Self {
        match event {
            DownloadEvent::Progress { id, sample } => Self::Progress {
                id: *id,
                sample: *sample,
            },
            DownloadEvent::Finished { id, outcome } => Self::Finished {
                id: *id,
                saved_path: outcome.saved_path(),
                error: outcome.error().map(|error| ErrorLine {
                    kind: error.kind(),
                    message: error.to_string(),
                }),
            },
        }
    }
}

/// Renders events either as JSON lines or as a progress bar on stderr.
pub(crate) enum EventSink {
    Json,
    Bar(ProgressView),
}

impl EventSink {
    pub(crate) fn new(json: bool, show_progress: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Bar(ProgressView::new(show_progress && io::stderr().is_terminal()))
        }
    }

    pub(crate) fn handle(&mut self, event: &DownloadEvent) -> serde_json::Result<()> {
        match self {
            Self::Json => {
                let line = serde_json::to_string(&EventLine::from_event(event))?;
                let mut stdout = io::stdout().lock();
                // A closed stdout must not abort the download.
                let _ = writeln!(stdout, "{line}");
            }
            Self::Bar(view) => match event {
                DownloadEvent::Progress { sample, .. } => view.update(*sample),
                DownloadEvent::Finished { outcome, .. } => view.finish(outcome),
            },
        }
        Ok(())
    }
}

/// Progress bar that switches to a spinner when the total is unknown.
pub(crate) struct ProgressView {
    bar: ProgressBar,
    sized: bool,
}

impl ProgressView {
    fn new(visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::with_template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { bar, sized: false }
    }

    fn update(&mut self, sample: ProgressSample) {
        if let Some(total) = sample.total
            && !self.sized
        {
            self.bar.set_length(total);
            self.bar.set_style(
                ProgressStyle::with_template(BAR_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            self.sized = true;
        }
        self.bar.set_position(sample.transferred);
    }

    fn finish(&self, outcome: &DownloadOutcome) {
        if outcome.is_saved() {
            self.bar.finish_and_clear();
        } else {
            self.bar.abandon();
        }
    }
}
