//! Time-based energy regeneration arithmetic.
//!
//! Regeneration is computed from *whole* elapsed intervals: each completed
//! 5-minute window credits one energy unit, and the refill timestamp advances
//! by exactly the credited intervals — never to "now". A partial interval
//! therefore keeps counting toward the next credit across repeated reads.

use serde::{Deserialize, Serialize};

use crate::constants::{ENERGY_CAP, ENERGY_PER_INTERVAL, REGEN_INTERVAL_MINUTES};

/// Result of applying elapsed time to an energy pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regen {
    /// Pool after crediting elapsed intervals, clamped to [`ENERGY_CAP`].
    pub amount: u32,
    /// Whole regeneration intervals that elapsed.
    pub intervals_elapsed: i64,
}

impl Regen {
    /// Minutes the refill timestamp must advance to account for the credit.
    pub fn credited_minutes(&self) -> i64 {
        self.intervals_elapsed * REGEN_INTERVAL_MINUTES
    }

    /// True when no interval completed — the read-only fast path, no write.
    pub fn is_noop(&self) -> bool {
        self.intervals_elapsed == 0
    }
}

/// Credit regeneration for `minutes_elapsed` minutes since the last refill.
///
/// Negative elapsed time (clock skew) credits nothing. The pool never
/// exceeds [`ENERGY_CAP`]; there is no error condition.
pub fn regenerate(amount: u32, minutes_elapsed: i64) -> Regen {
    let intervals_elapsed = minutes_elapsed.max(0) / REGEN_INTERVAL_MINUTES;
    let credited = (intervals_elapsed as u64) * (ENERGY_PER_INTERVAL as u64);
    let amount = (amount as u64 + credited).min(ENERGY_CAP as u64) as u32;
    Regen {
        amount,
        intervals_elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_time_no_credit() {
        let r = regenerate(42, 0);
        assert_eq!(r.amount, 42);
        assert_eq!(r.intervals_elapsed, 0);
        assert!(r.is_noop());
    }

    #[test]
    fn partial_interval_credits_nothing() {
        let r = regenerate(42, 4);
        assert_eq!(r.amount, 42);
        assert!(r.is_noop());
    }

    #[test]
    fn twenty_three_minutes_credits_four() {
        // 23 minutes = 4 whole intervals; 3 minutes of credit remain pending.
        let r = regenerate(75, 23);
        assert_eq!(r.amount, 79);
        assert_eq!(r.intervals_elapsed, 4);
        assert_eq!(r.credited_minutes(), 20);
    }

    #[test]
    fn clamps_at_cap() {
        let r = regenerate(98, 60);
        assert_eq!(r.amount, ENERGY_CAP);
        // Intervals still count even though the pool is capped.
        assert_eq!(r.intervals_elapsed, 12);
    }

    #[test]
    fn negative_elapsed_is_noop() {
        let r = regenerate(50, -30);
        assert_eq!(r.amount, 50);
        assert!(r.is_noop());
    }

    #[test]
    fn repeated_application_is_idempotent() {
        // Applying the credit, advancing the timestamp, then re-reading with
        // only the leftover minutes must credit nothing further.
        let first = regenerate(75, 23);
        let leftover = 23 - first.credited_minutes();
        let second = regenerate(first.amount, leftover);
        assert_eq!(second.amount, first.amount);
        assert!(second.is_noop());
    }

    #[test]
    fn monotonic_in_elapsed_time() {
        let mut last = 0;
        for minutes in 0..600 {
            let r = regenerate(10, minutes);
            assert!(r.amount >= last);
            assert!(r.amount <= ENERGY_CAP);
            last = r.amount;
        }
    }
}
