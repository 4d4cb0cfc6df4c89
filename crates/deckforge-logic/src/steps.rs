//! Step allocation under simultaneous energy and headroom constraints.
//!
//! A step costs [`ENERGY_PER_STEP`] energy and yields [`PROGRESS_PER_STEP`]
//! progress points. A bulk request is granted the largest step count that
//! respects the requested amount, the available energy, and the progress the
//! card can still absorb before the cap.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{ENERGY_PER_STEP, PROGRESS_CAP, PROGRESS_PER_STEP};

/// The constraint that bounded an allocation.
///
/// Diagnostic only — callers branch on the step count, never on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Limit {
    /// The full requested amount was granted.
    Requested,
    /// Available energy ran out first.
    Energy,
    /// Remaining progress headroom ran out first.
    Headroom,
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Requested => write!(f, "requested amount"),
            Limit::Energy => write!(f, "available energy"),
            Limit::Headroom => write!(f, "progress headroom"),
        }
    }
}

/// A granted step count and the constraint that bounded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub steps: u32,
    pub limited_by: Limit,
}

/// Steps a card can absorb before its progress reaches the cap.
pub fn headroom_steps(progress: u32) -> u32 {
    (PROGRESS_CAP - progress.min(PROGRESS_CAP)) / PROGRESS_PER_STEP
}

/// Grant the largest permissible step count for a bulk request.
///
/// `steps = min(requested, energy / cost_per_step, headroom)`. A zero grant
/// is reported with the constraint that caused it: a full card wins the
/// tie-break over an empty pool, since energy regenerates and progress
/// headroom does not.
pub fn allocate(requested: u32, energy: u32, progress: u32) -> Allocation {
    let affordable = energy / ENERGY_PER_STEP;
    let headroom = headroom_steps(progress);
    let steps = requested.min(affordable).min(headroom);

    let limited_by = if steps == 0 {
        if headroom == 0 {
            Limit::Headroom
        } else if affordable == 0 {
            Limit::Energy
        } else {
            Limit::Requested
        }
    } else if steps == requested {
        Limit::Requested
    } else if steps == affordable {
        Limit::Energy
    } else {
        Limit::Headroom
    };

    Allocation { steps, limited_by }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grants_full_request_when_unconstrained() {
        let a = allocate(10, 75, 0);
        assert_eq!(a.steps, 10);
        assert_eq!(a.limited_by, Limit::Requested);
    }

    #[test]
    fn energy_binds_before_request() {
        let a = allocate(50, 8, 0);
        assert_eq!(a.steps, 8);
        assert_eq!(a.limited_by, Limit::Energy);
    }

    #[test]
    fn headroom_binds_before_energy() {
        // 90% progress leaves room for 5 steps.
        let a = allocate(50, 75, 90);
        assert_eq!(a.steps, 5);
        assert_eq!(a.limited_by, Limit::Headroom);
    }

    #[test]
    fn odd_progress_rounds_headroom_down() {
        // 25% progress: 75 points of headroom, 37 whole steps.
        assert_eq!(headroom_steps(25), 37);
        let a = allocate(50, 100, 25);
        assert_eq!(a.steps, 37);
        assert_eq!(a.limited_by, Limit::Headroom);
    }

    #[test]
    fn zero_energy_reports_energy() {
        let a = allocate(10, 0, 40);
        assert_eq!(a.steps, 0);
        assert_eq!(a.limited_by, Limit::Energy);
    }

    #[test]
    fn full_progress_reports_headroom() {
        let a = allocate(10, 75, 100);
        assert_eq!(a.steps, 0);
        assert_eq!(a.limited_by, Limit::Headroom);
    }

    #[test]
    fn full_progress_wins_tie_break_over_empty_pool() {
        let a = allocate(10, 0, 100);
        assert_eq!(a.steps, 0);
        assert_eq!(a.limited_by, Limit::Headroom);
    }

    #[test]
    fn allocation_bound_holds_across_grid() {
        for requested in 0..=60 {
            for energy in (0..=120).step_by(7) {
                for progress in (0..=100).step_by(3) {
                    let a = allocate(requested, energy, progress);
                    assert!(a.steps <= requested);
                    assert!(a.steps <= energy);
                    assert!(a.steps <= headroom_steps(progress));
                }
            }
        }
    }
}
