//! Level transition state machine.
//!
//! A card's state is its `(level, progress)` pair. Applying steps moves
//! progress forward; reaching the progress cap while below [`MAX_LEVEL`]
//! produces exactly one level transition with progress reset to zero. Any
//! overflow beyond the cap is discarded, never carried into the next level.
//! At [`MAX_LEVEL`] the state is frozen.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_LEVEL, PROGRESS_CAP, PROGRESS_PER_STEP};

/// Outcome of applying progress steps to a card state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub level: u8,
    pub progress: u32,
    /// True when this application crossed the cap and raised the level.
    pub leveled_up: bool,
    /// True iff the resulting level is [`MAX_LEVEL`].
    pub max_level_reached: bool,
}

/// Whether a card satisfies the explicit level-up preconditions.
pub fn can_level_up(level: u8, progress: u32) -> bool {
    level < MAX_LEVEL && progress >= PROGRESS_CAP
}

/// Apply `steps` worth of progress to `(level, progress)`.
///
/// At most one level transition occurs per call. Upstream allocation bounds
/// the applied steps by the card's headroom, so the raw total cannot
/// meaningfully overshoot the cap; the clamp here is defensive.
pub fn apply_steps(level: u8, progress: u32, steps: u32) -> Transition {
    if level >= MAX_LEVEL {
        // Frozen: no progress, no transitions, regardless of input.
        return Transition {
            level,
            progress,
            leveled_up: false,
            max_level_reached: true,
        };
    }

    let raw = progress.saturating_add(steps.saturating_mul(PROGRESS_PER_STEP));
    if raw >= PROGRESS_CAP {
        let level = level + 1;
        Transition {
            level,
            progress: 0,
            leveled_up: true,
            max_level_reached: level >= MAX_LEVEL,
        }
    } else {
        Transition {
            level,
            progress: raw,
            leveled_up: false,
            max_level_reached: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_advance_keeps_level() {
        let t = apply_steps(1, 10, 5);
        assert_eq!(t.level, 1);
        assert_eq!(t.progress, 20);
        assert!(!t.leveled_up);
        assert!(!t.max_level_reached);
    }

    #[test]
    fn reaching_cap_levels_up_and_resets() {
        let t = apply_steps(1, 0, 50);
        assert_eq!(t.level, 2);
        assert_eq!(t.progress, 0);
        assert!(t.leveled_up);
        assert!(!t.max_level_reached);
    }

    #[test]
    fn overflow_is_discarded_not_carried() {
        let t = apply_steps(1, 90, 50);
        assert_eq!(t.level, 2);
        assert_eq!(t.progress, 0, "overflow must not carry into the new level");
    }

    #[test]
    fn single_transition_even_far_past_cap() {
        // 200 steps would be 400 progress points; still only one level-up.
        let t = apply_steps(1, 0, 200);
        assert_eq!(t.level, 2);
        assert_eq!(t.progress, 0);
    }

    #[test]
    fn transition_into_cap_sets_flag() {
        let t = apply_steps(2, 98, 1);
        assert_eq!(t.level, 3);
        assert_eq!(t.progress, 0);
        assert!(t.leveled_up);
        assert!(t.max_level_reached);
    }

    #[test]
    fn frozen_at_max_level() {
        let t = apply_steps(MAX_LEVEL, 60, 50);
        assert_eq!(t.level, MAX_LEVEL);
        assert_eq!(t.progress, 60);
        assert!(!t.leveled_up);
        assert!(t.max_level_reached);
    }

    #[test]
    fn level_never_exceeds_cap_across_grid() {
        for level in 1..=MAX_LEVEL {
            for progress in (0..=100).step_by(5) {
                for steps in (0..=60).step_by(4) {
                    let t = apply_steps(level, progress, steps);
                    assert!(t.level <= MAX_LEVEL);
                    assert!(t.progress <= PROGRESS_CAP);
                    if t.leveled_up {
                        assert_eq!(t.progress, 0);
                        assert_eq!(t.level, level + 1);
                    }
                }
            }
        }
    }

    #[test]
    fn can_level_up_requires_full_progress_below_cap() {
        assert!(can_level_up(1, 100));
        assert!(can_level_up(2, 100));
        assert!(!can_level_up(2, 99));
        assert!(!can_level_up(MAX_LEVEL, 100));
    }
}
