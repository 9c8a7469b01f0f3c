//! CRUD lifecycle state machine.
//!
//! ```text
//! Idle → Validating → BuildingRequest → AwaitingResponse → Merging → Persisting → Notifying → Idle
//!             │                                                  └────────────────┘
//!             ├→ Idle        (validation failed)
//!             └→ Persisting  (destroying a record never sent to the remote)
//! ```
//!
//! Collection fetches have no validation step and start at `BuildingRequest`.
//! Persisting is skipped when the exchange failed.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error};

/// One step of a save, fetch or destroy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Validating,
    BuildingRequest,
    AwaitingResponse,
    Merging,
    Persisting,
    Notifying,
}

impl SyncPhase {
    /// Whether the state machine allows moving from `self` to `next`.
    #[must_use]
    pub const fn can_advance_to(self, next: SyncPhase) -> bool {
        use SyncPhase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Idle, BuildingRequest)
                | (Validating, BuildingRequest)
                | (Validating, Idle)
                | (Validating, Persisting)
                | (BuildingRequest, AwaitingResponse)
                | (AwaitingResponse, Merging)
                | (Merging, Persisting)
                | (Merging, Notifying)
                | (Persisting, Notifying)
                | (Notifying, Idle)
        )
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Validating => "validating",
            SyncPhase::BuildingRequest => "building request",
            SyncPhase::AwaitingResponse => "awaiting response",
            SyncPhase::Merging => "merging",
            SyncPhase::Persisting => "persisting",
            SyncPhase::Notifying => "notifying",
        };
        f.write_str(name)
    }
}

/// Tracks the phases one operation passes through.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    current: SyncPhase,
    trail: Vec<SyncPhase>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// A lifecycle sitting in `Idle`.
    pub fn new() -> Self {
        Self {
            current: SyncPhase::Idle,
            trail: vec![SyncPhase::Idle],
        }
    }

    /// The phase the operation is in.
    pub fn current(&self) -> SyncPhase {
        self.current
    }

    /// Every phase entered so far, starting with `Idle`.
    pub fn trail(&self) -> &[SyncPhase] {
        &self.trail
    }

    /// Moves to `next`. An illegal transition is logged and still recorded.
    pub fn advance(&mut self, next: SyncPhase) {
        if !self.current.can_advance_to(next) {
            error!("illegal sync transition {} -> {}", self.current, next);
        }
        debug!("sync phase {} -> {}", self.current, next);
        self.current = next;
        self.trail.push(next);
    }

    /// Returns to `Idle` and yields the full trail.
    pub fn finish(mut self) -> Vec<SyncPhase> {
        self.advance(SyncPhase::Idle);
        self.trail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_legal() {
        let mut lifecycle = Lifecycle::new();
        for phase in [
            SyncPhase::Validating,
            SyncPhase::BuildingRequest,
            SyncPhase::AwaitingResponse,
            SyncPhase::Merging,
            SyncPhase::Persisting,
            SyncPhase::Notifying,
        ] {
            lifecycle.advance(phase);
        }
        assert_eq!(lifecycle.current(), SyncPhase::Notifying);
        assert_eq!(lifecycle.finish().len(), 8);
    }

    #[test]
    fn shortcuts() {
        assert!(SyncPhase::Validating.can_advance_to(SyncPhase::Idle));
        assert!(SyncPhase::Merging.can_advance_to(SyncPhase::Notifying));
        assert!(!SyncPhase::Idle.can_advance_to(SyncPhase::Merging));
        assert!(!SyncPhase::AwaitingResponse.can_advance_to(SyncPhase::Persisting));
    }

    #[test]
    fn illegal_transition_is_recorded() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(SyncPhase::Merging);
        assert_eq!(lifecycle.current(), SyncPhase::Merging);
        assert_eq!(lifecycle.trail(), &[SyncPhase::Idle, SyncPhase::Merging]);
    }
}
