//! Per-request lifecycle.
//!
//! ```text
//! Pending ──► InFlight ──► Succeeded
//!    │            │
//!    └────────────┴──────► Failed
//! ```

use serde::Serialize;

/// Lifecycle state of one download request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadState {
    /// Request accepted, no response received yet.
    Pending,
    /// Response accepted, body streaming to disk.
    InFlight,
    /// File fully written and moved into place.
    Succeeded,
    /// Transfer ended with an error.
    Failed,
}

impl DownloadState {
    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InFlight | Self::Failed)
                | (Self::InFlight, Self::Succeeded | Self::Failed)
        )
    }

    /// Moves to `next` if legal, leaving `self` unchanged otherwise.
    ///
    /// Returns whether the transition happened.
    pub fn transition(&mut self, next: Self) -> bool {
        if self.can_transition_to(next) {
            *self = next;
            true
        } else {
            false
        }
    }
}
