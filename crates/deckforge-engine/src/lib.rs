//! Deckforge progression engine.
//!
//! Gates incremental card progress behind a per-user renewable energy pool:
//! energy regenerates on a fixed interval, each spent unit buys two progress
//! points, and a card at full progress levels up until the level cap. The
//! pure math lives in `deckforge-logic`; this crate owns the records, the
//! store contract, and the transaction coordinator that commits card and
//! energy changes as one unit.

pub mod clock;
pub mod engine;
pub mod seed;
pub mod store;
pub mod tables;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{
    BulkOutcome, CardCollection, EngineError, EnergySnapshot, LevelUpOutcome, ProgressionEngine,
    StepOutcome,
};
pub use store::{CardWrite, EnergyWrite, MemoryStore, ProgressStore, StoreError, Versioned};
pub use tables::{Card, CardId, EnergyAccount, Rarity, UserId};
