//! Round lifecycle phase derived from wall-clock time and the round snapshot.
//!
//! ## Priority
//!
//! The contract reports independent flags and timestamps that can overlap, so
//! the phase is resolved in a fixed order and exactly one phase is returned:
//!
//! 1. **Finalized** - `finalized` is set, regardless of timestamps
//! 2. **Upcoming** - `end_time` is unset (`0`)
//! 3. **Active** / **Upcoming** - before `end_time`; `Active` only if `is_active`
//! 4. **RevealWindow** - at or after `end_time` and before a set `reveal_deadline`
//! 5. **AwaitingFinalization** - everything else
//!
//! The reveal window is driven by time alone. The contract flips `is_active`
//! off lazily, so a round whose sale has ended can still report `is_active`.
//!
//! All inputs are unix seconds. [phase_of] is total; it never fails.

use lottery_types::{Action, Error, Phase, Result, RoundSnapshot};
use tracing::debug;

/// Compute the phase of `snapshot` at `now`.
pub fn phase_of(now: u64, snapshot: &RoundSnapshot) -> Phase {
    if snapshot.finalized {
        return Phase::Finalized;
    }
    if snapshot.end_time == 0 {
        return Phase::Upcoming;
    }
    if now < snapshot.end_time {
        return if snapshot.is_active {
            Phase::Active
        } else {
            Phase::Upcoming
        };
    }
    if snapshot.reveal_deadline > 0 && now < snapshot.reveal_deadline {
        return Phase::RevealWindow;
    }
    Phase::AwaitingFinalization
}

/// Fail with [Error::PhaseViolation] unless `action` is legal at `now`.
///
/// Returns the phase the action was checked against.
pub fn ensure_allowed(now: u64, snapshot: &RoundSnapshot, action: Action) -> Result<Phase> {
    let phase = phase_of(now, snapshot);
    if phase.allows(action) {
        return Ok(phase);
    }
    debug!(round_id = snapshot.round_id, %phase, %action, "action refused by phase gate");
    Err(Error::PhaseViolation {
        action,
        phase,
        round_id: snapshot.round_id,
    })
}

/// Seconds until the phase can next change because of time alone.
///
/// `None` when no timestamp boundary lies ahead (finalized, unconfigured, or
/// past the reveal deadline).
pub fn next_transition(now: u64, snapshot: &RoundSnapshot) -> Option<u64> {
    if snapshot.finalized || snapshot.end_time == 0 {
        return None;
    }
    if now < snapshot.end_time {
        return Some(snapshot.end_time - now);
    }
    if snapshot.reveal_deadline > now {
        return Some(snapshot.reveal_deadline - now);
    }
    None
}
