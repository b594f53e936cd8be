//! Mission module - wave tables and party assembly
//!
//! Mission data is inline. Only mission 1 exists; any other id is rejected so
//! callers can tell "nothing to fight" apart from "mission complete".

use arrayvec::ArrayVec;
use log::warn;

use crate::combatant::{Character, Enemy, Fighter};
use crate::error::{BattleError, BattleResult};
use crate::types::{Attribute, ROSTER_SLOTS};

/// Party roster, in slot order
pub type Party = ArrayVec<Character, ROSTER_SLOTS>;

/// An ordered group of enemies fought together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wave {
    enemies: Vec<Enemy>,
}

impl Wave {
    pub fn new(enemies: Vec<Enemy>) -> Self {
        Self { enemies }
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    /// Every enemy is at 0 HP (an empty wave counts as defeated)
    pub fn all_defeated(&self) -> bool {
        self.enemies.iter().all(|e| !e.is_alive())
    }

    pub fn living(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.is_alive())
    }

    pub fn living_count(&self) -> usize {
        self.living().count()
    }

    /// Restore every enemy in the wave
    pub fn reset(&mut self) {
        for enemy in &mut self.enemies {
            enemy.reset();
        }
    }
}

/// (id, attribute, max HP, cooldown, icon) rows of one wave
type WaveTable = &'static [(u32, Attribute, u32, u32, &'static str)];

const MISSION_1: [WaveTable; 3] = [
    &[
        (101, Attribute::Water, 100, 3, "enemy/100n"),
        (102, Attribute::Fire, 100, 3, "enemy/96n"),
        (103, Attribute::Earth, 100, 3, "enemy/98n"),
    ],
    &[
        (201, Attribute::Light, 200, 4, "enemy/102n"),
        (202, Attribute::Earth, 300, 3, "enemy/267n"),
        (203, Attribute::Dark, 100, 4, "enemy/104n"),
    ],
    &[(301, Attribute::Fire, 500, 5, "enemy/180n")],
];

/// Build the wave list for `mission_id`
pub fn generate_waves(mission_id: u32) -> BattleResult<Vec<Wave>> {
    let table: &[WaveTable] = match mission_id {
        1 => &MISSION_1,
        other => {
            warn!("generate_waves: unsupported mission id {}", other);
            return Err(BattleError::UnsupportedMission(other));
        }
    };

    Ok(table
        .iter()
        .map(|rows| {
            Wave::new(
                rows.iter()
                    .map(|&(id, attr, hp, cooldown, icon)| Enemy::new(id, attr, hp, cooldown, icon))
                    .collect(),
            )
        })
        .collect())
}

/// Build the party from the six roster slots (0 = empty slot).
///
/// HP is split evenly across the selected characters.
pub fn assemble_party(selection: [u32; ROSTER_SLOTS], total_party_hp: u32) -> BattleResult<Party> {
    let selected = selection.iter().filter(|&&id| id != 0).count() as u32;
    if selected == 0 {
        warn!("assemble_party: roster has no selected characters");
        return Err(BattleError::EmptyRoster);
    }

    Ok(selection
        .iter()
        .filter(|&&id| id != 0)
        .map(|&id| Character::for_party(id, Character::attribute_for_id(id), total_party_hp, selected))
        .collect())
}
