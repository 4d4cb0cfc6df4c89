//! Demo dataset: two users with energy accounts and a six-card spread
//! covering every rarity, all three levels, and progress from 0 to 100.
//!
//! Used by the headless harness and handy for local experimentation; tests
//! that need a precise starting state insert their own rows instead.

use chrono::{DateTime, Duration, Utc};

use crate::store::MemoryStore;
use crate::tables::{Card, EnergyAccount, Rarity, UserId};

pub const USER_ONE: UserId = 1;
pub const USER_TWO: UserId = 2;

/// Build a store seeded relative to `now`.
///
/// User 1 holds 75 energy refilled 10 minutes ago (two intervals pending);
/// user 2 holds a full pool refilled half an hour ago.
pub fn demo_store(now: DateTime<Utc>) -> MemoryStore {
    let store = MemoryStore::new();

    store.insert_energy(EnergyAccount {
        user_id: USER_ONE,
        amount: 75,
        last_refill_at: now - Duration::minutes(10),
    });
    store.insert_energy(EnergyAccount {
        user_id: USER_TWO,
        amount: 100,
        last_refill_at: now - Duration::minutes(30),
    });

    let cards = [
        (1, USER_ONE, "Flame Longsword", "Longsword", Rarity::Legendary, 3, 60),
        (2, USER_ONE, "Frost Arcane Staff", "Arcane Staff", Rarity::Rare, 2, 100),
        (3, USER_TWO, "Storm Scimitar", "Scimitar", Rarity::Common, 1, 25),
        (4, USER_TWO, "Earthen Bulwark", "Shield", Rarity::Epic, 3, 80),
        (5, USER_ONE, "Gale War Axe", "War Axe", Rarity::Uncommon, 1, 0),
        (6, USER_TWO, "Shadow Grimoire", "Grimoire", Rarity::Legendary, 2, 50),
    ];
    for (id, user_id, name, category, rarity, level, progress) in cards {
        store.insert_card(Card {
            id,
            user_id,
            name: name.into(),
            category: category.into(),
            rarity,
            level,
            progress,
            created_at: now - Duration::days(7),
        });
    }

    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ProgressStore;
    use deckforge_logic::constants::{ENERGY_CAP, MAX_LEVEL, PROGRESS_CAP};

    #[test]
    fn seed_rows_respect_invariants() {
        let store = demo_store(Utc::now());
        for user in [USER_ONE, USER_TWO] {
            let energy = store.find_energy(user).unwrap().unwrap();
            assert!(energy.row.amount <= ENERGY_CAP);
            let cards = store.find_cards_by_user(user).unwrap();
            assert_eq!(cards.len(), 3);
            for card in cards {
                assert!((1..=MAX_LEVEL).contains(&card.level));
                assert!(card.progress <= PROGRESS_CAP);
            }
        }
    }
}
