//! Record types for the progression engine.
//!
//! Plain serde structs, one per stored table. Creation and acquisition of
//! these records happen outside the engine; it only reads them and commits
//! updates through the store contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type CardId = u64;

// ============================================================================
// CARDS
// ============================================================================

/// Card rarity tier. Cosmetic metadata — progression rules ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// A collectible card owned by exactly one user.
///
/// Invariants: `1 <= level <= MAX_LEVEL`, `0 <= progress <= 100`, and
/// progress is frozen once the level cap is reached. Progress resets to
/// exactly zero on every level transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// Owner. Immutable after creation; every operation verifies it.
    pub user_id: UserId,
    pub name: String,
    pub category: String,
    pub rarity: Rarity,
    pub level: u8,
    /// Progress percentage toward the next level.
    pub progress: u32,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// ENERGY
// ============================================================================

/// Per-user renewable energy pool. One account per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyAccount {
    pub user_id: UserId,
    /// Current pool, `0..=ENERGY_CAP`.
    pub amount: u32,
    /// Instant up to which regeneration has already been credited.
    /// Advances by whole intervals only, never to "now".
    pub last_refill_at: DateTime<Utc>,
}
