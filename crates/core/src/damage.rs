//! Damage module - how cleared gems turn into enemy HP loss
//!
//! Damage is the raw count of cleared gems. The policy only decides which living
//! enemies absorb it.

use crate::combatant::Fighter;
use crate::mission::Wave;

/// Target selection for player damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DamagePolicy {
    /// Everything hits the first living enemy; overflow carries to the next one
    #[default]
    FocusFirst,
    /// Integer split across living enemies, remainder to the front of the wave
    SplitEvenly,
}

impl DamagePolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "focus" | "focus_first" | "focusfirst" => Some(DamagePolicy::FocusFirst),
            "split" | "split_evenly" | "splitevenly" => Some(DamagePolicy::SplitEvenly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DamagePolicy::FocusFirst => "focus",
            DamagePolicy::SplitEvenly => "split",
        }
    }
}

/// One enemy's share of a damage application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub enemy_id: u32,
    pub amount: u32,
    pub remaining_hp: u32,
}

/// Apply `total` damage to the living enemies of `wave`.
///
/// Returns one [`Hit`] per enemy that took damage, in wave order. Damage that
/// exceeds the wave's remaining HP is discarded.
pub fn apply_player_damage(wave: &mut Wave, total: u32, policy: DamagePolicy) -> Vec<Hit> {
    let mut hits = Vec::new();
    if total == 0 {
        return hits;
    }

    match policy {
        DamagePolicy::FocusFirst => {
            let mut left = total;
            for enemy in wave.enemies_mut().iter_mut().filter(|e| e.is_alive()) {
                if left == 0 {
                    break;
                }
                let amount = left.min(enemy.stats().current_hp());
                enemy.take_damage(amount);
                left -= amount;
                hits.push(Hit {
                    enemy_id: enemy.id(),
                    amount,
                    remaining_hp: enemy.stats().current_hp(),
                });
            }
        }
        DamagePolicy::SplitEvenly => {
            let living = wave.living_count() as u32;
            if living == 0 {
                return hits;
            }
            let share = total / living;
            let mut remainder = total % living;
            for enemy in wave.enemies_mut().iter_mut().filter(|e| e.is_alive()) {
                let mut amount = share;
                if remainder > 0 {
                    amount += 1;
                    remainder -= 1;
                }
                if amount == 0 {
                    continue;
                }
                let amount = amount.min(enemy.stats().current_hp());
                enemy.take_damage(amount);
                hits.push(Hit {
                    enemy_id: enemy.id(),
                    amount,
                    remaining_hp: enemy.stats().current_hp(),
                });
            }
        }
    }

    hits
}
