//! Wall-clock budget shared by the external calls of one turn.

use std::time::Duration;
use tokio::time::Instant;

/// Turn budget used unless configured otherwise
pub const DEFAULT_TURN_BUDGET: Duration = Duration::from_secs(12);

/// Below this a hop is not worth starting; the turn moves to its next fallback.
pub const MIN_HOP: Duration = Duration::from_millis(500);

/// Time left for one turn's external calls.
///
/// Each hop is capped at the per-hop deadline and at whatever remains of the
/// turn, so a run of slow but successful calls cannot push the answer past the
/// point where the telephony provider gives up on the callback.
#[derive(Debug, Clone, Copy)]
pub struct TurnBudget {
    ends_at: Instant,
    per_hop: Duration,
}

impl TurnBudget {
    pub fn start(total: Duration, per_hop: Duration) -> Self {
        Self {
            ends_at: Instant::now() + total,
            per_hop,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.ends_at.saturating_duration_since(Instant::now())
    }

    /// Deadline for the next hop, or `None` when too little time is left to try it.
    pub fn next_hop(&self) -> Option<Duration> {
        let hop = self.per_hop.min(self.remaining());
        (hop >= MIN_HOP).then_some(hop)
    }
}
