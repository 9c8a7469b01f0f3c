use crate::lifecycle::SyncPhase;
use syncstack_types::Exchange;

/// What a completed round trip did.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    /// The round trip, carrying the error if it failed.
    pub exchange: Exchange,
    /// Phases traversed, from `Idle` back to `Idle`.
    pub phases: Vec<SyncPhase>,
    /// Records whose properties changed while merging the response.
    pub merged: usize,
    /// Records newly added to the set (collection fetch only).
    pub added: usize,
    /// Whether the local store committed.
    pub persisted: bool,
}

impl SyncReport {
    /// Whether the round trip and the local commit both succeeded.
    pub fn is_success(&self) -> bool {
        self.exchange.is_success()
    }
}

/// Result of a save, fetch or destroy that was not rejected as misconfigured.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The request was sent and the lifecycle ran to completion, successfully
    /// or not.
    Completed(SyncReport),
    /// Validation rejected the record; nothing was sent or notified.
    Invalid {
        error: String,
        phases: Vec<SyncPhase>,
    },
    /// There was nothing to send.
    Skipped { reason: String },
}

impl SyncOutcome {
    /// The report of a completed operation.
    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }

    /// The exchange of a completed operation.
    pub fn exchange(&self) -> Option<&Exchange> {
        self.report().map(|r| &r.exchange)
    }

    /// Whether the operation completed without error.
    pub fn is_success(&self) -> bool {
        self.report().is_some_and(SyncReport::is_success)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}
