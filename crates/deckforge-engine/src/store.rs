//! Store contract and in-memory implementation.
//!
//! The engine depends on a narrow storage capability: find a card or energy
//! account by key, list a user's cards, and commit a paired update
//! atomically. Every row read carries a version; a commit names the versions
//! it read, and any mismatch aborts the whole commit. That per-row
//! compare-and-swap is the serialization contract — two operations racing on
//! the same user cannot both debit from a stale snapshot; the loser gets
//! [`StoreError::Conflict`] and may retry from a fresh read.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use crate::tables::{Card, CardId, EnergyAccount, UserId};

/// Storage-level failures surfaced to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A row changed between read and commit; retry from a fresh read.
    #[error("row version changed since it was read")]
    Conflict,
    /// A commit referenced a row that no longer exists.
    #[error("row to update does not exist")]
    Missing,
}

/// A row together with the version observed at read time.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub row: T,
    pub version: u64,
}

/// A card update bound to the version it was computed from.
#[derive(Debug, Clone)]
pub struct CardWrite {
    pub card: Card,
    pub expected_version: u64,
}

/// An energy account update bound to the version it was computed from.
#[derive(Debug, Clone)]
pub struct EnergyWrite {
    pub account: EnergyAccount,
    pub expected_version: u64,
}

/// Lookup and atomic-update capability the engine is built against.
///
/// Implementations must make `update_paired` all-or-nothing and must not
/// require the caller to hold any lock across round trips.
pub trait ProgressStore {
    /// Find a card by id, filtered to the given owner. A card owned by a
    /// different user is absent, not an error.
    fn find_card(&self, card_id: CardId, user_id: UserId)
        -> Result<Option<Versioned<Card>>, StoreError>;

    /// All cards owned by the user, in insertion order.
    fn find_cards_by_user(&self, user_id: UserId) -> Result<Vec<Card>, StoreError>;

    /// The user's energy account.
    fn find_energy(&self, user_id: UserId) -> Result<Option<Versioned<EnergyAccount>>, StoreError>;

    /// Commit every supplied write, or none of them.
    ///
    /// Both writes are validated against their expected versions before
    /// either is applied; a stale version fails the whole commit with
    /// [`StoreError::Conflict`].
    fn update_paired(
        &self,
        card: Option<CardWrite>,
        energy: Option<EnergyWrite>,
    ) -> Result<(), StoreError>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Debug)]
struct Slot<T> {
    row: T,
    version: u64,
}

#[derive(Debug, Default)]
struct Inner {
    cards: HashMap<CardId, Slot<Card>>,
    energy: HashMap<UserId, Slot<EnergyAccount>>,
}

/// In-process store: two keyed tables behind one mutex, per-row versions
/// bumped on every committed write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace a card. Resets its version counter.
    pub fn insert_card(&self, card: Card) {
        self.lock()
            .cards
            .insert(card.id, Slot { row: card, version: 1 });
    }

    /// Seed or replace an energy account. Resets its version counter.
    pub fn insert_energy(&self, account: EnergyAccount) {
        self.lock()
            .energy
            .insert(account.user_id, Slot { row: account, version: 1 });
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave a half-applied commit:
        // writes are validated before any mutation.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressStore for MemoryStore {
    fn find_card(
        &self,
        card_id: CardId,
        user_id: UserId,
    ) -> Result<Option<Versioned<Card>>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .cards
            .get(&card_id)
            .filter(|slot| slot.row.user_id == user_id)
            .map(|slot| Versioned {
                row: slot.row.clone(),
                version: slot.version,
            }))
    }

    fn find_cards_by_user(&self, user_id: UserId) -> Result<Vec<Card>, StoreError> {
        let inner = self.lock();
        let mut cards: Vec<Card> = inner
            .cards
            .values()
            .filter(|slot| slot.row.user_id == user_id)
            .map(|slot| slot.row.clone())
            .collect();
        cards.sort_by_key(|card| card.id);
        Ok(cards)
    }

    fn find_energy(&self, user_id: UserId) -> Result<Option<Versioned<EnergyAccount>>, StoreError> {
        let inner = self.lock();
        Ok(inner.energy.get(&user_id).map(|slot| Versioned {
            row: slot.row.clone(),
            version: slot.version,
        }))
    }

    fn update_paired(
        &self,
        card: Option<CardWrite>,
        energy: Option<EnergyWrite>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();

        // Validate every write first so a failure applies nothing.
        if let Some(write) = &card {
            let slot = inner.cards.get(&write.card.id).ok_or(StoreError::Missing)?;
            if slot.version != write.expected_version {
                return Err(StoreError::Conflict);
            }
        }
        if let Some(write) = &energy {
            let slot = inner
                .energy
                .get(&write.account.user_id)
                .ok_or(StoreError::Missing)?;
            if slot.version != write.expected_version {
                return Err(StoreError::Conflict);
            }
        }

        if let Some(write) = card {
            if let Some(slot) = inner.cards.get_mut(&write.card.id) {
                slot.row = write.card;
                slot.version += 1;
            }
        }
        if let Some(write) = energy {
            if let Some(slot) = inner.energy.get_mut(&write.account.user_id) {
                slot.row = write.account;
                slot.version += 1;
            }
        }
        Ok(())
    }
}
