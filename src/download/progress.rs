//! Progress accounting for a single transfer.

use serde::Serialize;

/// Running byte count of a transfer.
///
/// `total` is `None` when the server did not advertise a Content-Length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSample {
    /// Bytes written so far.
    pub transferred: u64,
    /// Expected size in bytes, if known.
    pub total: Option<u64>,
}

impl ProgressSample {
    /// Completion ratio in `0.0..=1.0`, or `None` when the total is unknown.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some(self.transferred as f64 / total as f64),
            None => None,
        }
    }
}

/// Body delivered more bytes than the advertised length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Overrun {
    pub(crate) expected: u64,
    pub(crate) received: u64,
}

/// Accumulates chunk sizes into monotonically increasing samples.
#[derive(Debug, Clone)]
pub(crate) struct ProgressTracker {
    transferred: u64,
    total: Option<u64>,
}

impl ProgressTracker {
    pub(crate) fn new(total: Option<u64>) -> Self {
        Self {
            transferred: 0,
            total,
        }
    }

    /// Records a received chunk.
    ///
    /// Returns `Ok(None)` for empty chunks so no duplicate sample is emitted.
    pub(crate) fn record(&mut self, chunk_len: usize) -> Result<Option<ProgressSample>, Overrun> {
        if chunk_len == 0 {
            return Ok(None);
        }
        let received = self.transferred.saturating_add(chunk_len as u64);
        if let Some(expected) = self.total
            && received > expected
        {
            return Err(Overrun { expected, received });
        }
        self.transferred = received;
        Ok(Some(self.sample()))
    }

    pub(crate) fn sample(&self) -> ProgressSample {
        ProgressSample {
            transferred: self.transferred,
            total: self.total,
        }
    }

    /// True when the advertised length is known and has not been reached.
    pub(crate) fn is_short(&self) -> bool {
        self.total.is_some_and(|total| self.transferred < total)
    }

    pub(crate) fn transferred(&self) -> u64 {
        self.transferred
    }

    pub(crate) fn total(&self) -> Option<u64> {
        self.total
    }
}
