//! Progression transaction coordinator.
//!
//! Every operation is a short read → compute → commit sequence: load the
//! records, apply the pure progression math, then commit card and energy
//! state through one atomic paired write. Validation failures are ordinary
//! outcomes reported through [`EngineError`]; nothing here retries or
//! panics, and no lock is held across store round trips.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use deckforge_logic::constants::{
    ENERGY_PER_STEP, MAX_BULK_STEPS, MAX_LEVEL, MIN_BULK_STEPS, PROGRESS_CAP, PROGRESS_PER_STEP,
};
use deckforge_logic::steps::Limit;
use deckforge_logic::{levels, regen, steps};

use crate::clock::Clock;
use crate::store::{CardWrite, EnergyWrite, ProgressStore, StoreError, Versioned};
use crate::tables::{Card, CardId, EnergyAccount, UserId};

/// Recoverable operation outcomes, mapped by the caller onto its transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid step count {requested}: must be between {} and {}", MIN_BULK_STEPS, MAX_BULK_STEPS)]
    InvalidInput { requested: u32 },
    #[error("card or energy account not found for this user")]
    NotFound,
    #[error("card has already reached the maximum level ({})", MAX_LEVEL)]
    MaxLevelReached,
    #[error("card progress is already at 100%")]
    ProgressFull,
    #[error("card progress must be at 100% to level up")]
    ProgressIncomplete,
    #[error("not enough energy")]
    InsufficientEnergy,
    #[error("cannot process any steps: limited by {limited_by}")]
    NoCapacity { limited_by: Limit },
    #[error("stored state changed during the operation, retry")]
    Conflict,
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            // A vanished row mid-operation is concurrent interference too;
            // both cases are retryable from a fresh read.
            StoreError::Conflict | StoreError::Missing => EngineError::Conflict,
        }
    }
}

// ============================================================================
// OPERATION RESULTS
// ============================================================================

/// Energy read-back after regeneration-on-read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergySnapshot {
    pub energy: u32,
}

/// Result of a single progress step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub progress: u32,
    pub energy: u32,
}

/// Result of a bulk progress request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub progress: u32,
    pub level: u8,
    pub energy: u32,
    pub steps_processed: u32,
    pub max_level_reached: bool,
}

/// Result of an explicit level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpOutcome {
    pub card_id: CardId,
    pub level: u8,
    pub progress: u32,
    pub max_level_reached: bool,
}

/// A user's card catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCollection {
    pub cards: Vec<Card>,
    pub total: usize,
    pub max_level: u8,
}

// ============================================================================
// COORDINATOR
// ============================================================================

/// The progression engine: one instance per store, shared across callers.
///
/// Serialization of racing writers is delegated to the store's versioned
/// commit; the engine surfaces [`EngineError::Conflict`] and leaves retry to
/// the caller.
pub struct ProgressionEngine<S, C> {
    store: S,
    clock: C,
}

impl<S: ProgressStore, C: Clock> ProgressionEngine<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply pending regeneration to an account as of the engine clock.
    ///
    /// The refill timestamp advances by the credited intervals only, so a
    /// partial interval keeps counting toward the next credit.
    fn refresh(&self, account: &EnergyAccount) -> (EnergyAccount, regen::Regen) {
        let minutes = (self.clock.now() - account.last_refill_at).num_minutes();
        let credit = regen::regenerate(account.amount, minutes);
        let refreshed = EnergyAccount {
            user_id: account.user_id,
            amount: credit.amount,
            last_refill_at: account.last_refill_at + Duration::minutes(credit.credited_minutes()),
        };
        (refreshed, credit)
    }

    /// Current energy, crediting any regeneration earned since the last read.
    ///
    /// Writes the account only when at least one interval completed.
    pub fn energy(&self, user_id: UserId) -> Result<EnergySnapshot, EngineError> {
        let stored = self.store.find_energy(user_id)?.ok_or(EngineError::NotFound)?;
        let (refreshed, credit) = self.refresh(&stored.row);

        if !credit.is_noop() {
            self.store.update_paired(
                None,
                Some(EnergyWrite {
                    account: refreshed.clone(),
                    expected_version: stored.version,
                }),
            )?;
            log::debug!(
                "user {}: credited {} energy ({} intervals), pool now {}",
                user_id,
                refreshed.amount - stored.row.amount,
                credit.intervals_elapsed,
                refreshed.amount
            );
        }

        Ok(EnergySnapshot {
            energy: refreshed.amount,
        })
    }

    /// Apply exactly one progress step to a card.
    ///
    /// Costs one energy unit and yields two progress points, clamped at the
    /// progress cap. Never levels the card up — that requires an explicit
    /// [`Self::level_up`] once progress reaches 100.
    pub fn single_step(&self, user_id: UserId, card_id: CardId) -> Result<StepOutcome, EngineError> {
        let card = self.find_owned_card(card_id, user_id)?;
        let stored_energy = self.store.find_energy(user_id)?.ok_or(EngineError::NotFound)?;

        if card.row.level >= MAX_LEVEL {
            return Err(EngineError::MaxLevelReached);
        }
        if card.row.progress >= PROGRESS_CAP {
            return Err(EngineError::ProgressFull);
        }

        let (account, _) = self.refresh(&stored_energy.row);
        if account.amount < ENERGY_PER_STEP {
            return Err(EngineError::InsufficientEnergy);
        }

        let progress = (card.row.progress + PROGRESS_PER_STEP).min(PROGRESS_CAP);
        let energy = account.amount - ENERGY_PER_STEP;

        let mut updated_card = card.row.clone();
        updated_card.progress = progress;
        let updated_account = EnergyAccount {
            amount: energy,
            ..account
        };

        self.store.update_paired(
            Some(CardWrite {
                card: updated_card,
                expected_version: card.version,
            }),
            Some(EnergyWrite {
                account: updated_account,
                expected_version: stored_energy.version,
            }),
        )?;

        log::info!(
            "user {}: card {} stepped to {}%, {} energy left",
            user_id,
            card_id,
            progress,
            energy
        );
        Ok(StepOutcome { progress, energy })
    }

    /// Apply up to `requested` progress steps in one transaction.
    ///
    /// The granted count is bounded by available energy and by the progress
    /// the card can still absorb; crossing the cap levels the card up once
    /// with any overflow discarded.
    pub fn bulk_steps(
        &self,
        user_id: UserId,
        card_id: CardId,
        requested: u32,
    ) -> Result<BulkOutcome, EngineError> {
        if !(MIN_BULK_STEPS..=MAX_BULK_STEPS).contains(&requested) {
            return Err(EngineError::InvalidInput { requested });
        }

        let card = self.find_owned_card(card_id, user_id)?;
        let stored_energy = self.store.find_energy(user_id)?.ok_or(EngineError::NotFound)?;

        // Cap check precedes allocation: a frozen card never reaches the
        // allocator, whatever the energy situation.
        if card.row.level >= MAX_LEVEL {
            return Err(EngineError::MaxLevelReached);
        }

        let (account, _) = self.refresh(&stored_energy.row);
        let allocation = steps::allocate(requested, account.amount, card.row.progress);
        if allocation.steps == 0 {
            log::debug!(
                "user {}: bulk request of {} on card {} rejected, {}",
                user_id,
                requested,
                card_id,
                allocation.limited_by
            );
            return Err(EngineError::NoCapacity {
                limited_by: allocation.limited_by,
            });
        }

        let transition = levels::apply_steps(card.row.level, card.row.progress, allocation.steps);
        let energy = account.amount - allocation.steps * ENERGY_PER_STEP;

        let mut updated_card = card.row.clone();
        updated_card.level = transition.level;
        updated_card.progress = transition.progress;
        let updated_account = EnergyAccount {
            amount: energy,
            ..account
        };

        self.store.update_paired(
            Some(CardWrite {
                card: updated_card,
                expected_version: card.version,
            }),
            Some(EnergyWrite {
                account: updated_account,
                expected_version: stored_energy.version,
            }),
        )?;

        if transition.leveled_up {
            log::info!(
                "user {}: card {} processed {} steps and reached level {}",
                user_id,
                card_id,
                allocation.steps,
                transition.level
            );
        } else {
            log::info!(
                "user {}: card {} processed {} steps to {}%",
                user_id,
                card_id,
                allocation.steps,
                transition.progress
            );
        }

        Ok(BulkOutcome {
            progress: transition.progress,
            level: transition.level,
            energy,
            steps_processed: allocation.steps,
            max_level_reached: transition.max_level_reached,
        })
    }

    /// Promote a card whose progress has reached 100%.
    ///
    /// Reads and writes the card only; energy is not involved.
    pub fn level_up(&self, user_id: UserId, card_id: CardId) -> Result<LevelUpOutcome, EngineError> {
        let card = self.find_owned_card(card_id, user_id)?;

        if card.row.level >= MAX_LEVEL {
            return Err(EngineError::MaxLevelReached);
        }
        if !levels::can_level_up(card.row.level, card.row.progress) {
            return Err(EngineError::ProgressIncomplete);
        }

        let mut updated_card = card.row.clone();
        updated_card.level = card.row.level + 1;
        updated_card.progress = 0;
        let level = updated_card.level;

        self.store.update_paired(
            Some(CardWrite {
                card: updated_card,
                expected_version: card.version,
            }),
            None,
        )?;

        log::info!("user {}: card {} leveled up to {}", user_id, card_id, level);
        Ok(LevelUpOutcome {
            card_id,
            level,
            progress: 0,
            max_level_reached: level >= MAX_LEVEL,
        })
    }

    /// Read-only catalog of the user's cards.
    pub fn cards(&self, user_id: UserId) -> Result<CardCollection, EngineError> {
        let cards = self.store.find_cards_by_user(user_id)?;
        Ok(CardCollection {
            total: cards.len(),
            cards,
            max_level: MAX_LEVEL,
        })
    }

    fn find_owned_card(
        &self,
        card_id: CardId,
        user_id: UserId,
    ) -> Result<Versioned<Card>, EngineError> {
        self.store
            .find_card(card_id, user_id)?
            .ok_or(EngineError::NotFound)
    }
}
