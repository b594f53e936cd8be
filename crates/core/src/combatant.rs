//! Combatant module - HP pools, attack power, enemy cooldowns
//!
//! Player characters and enemies share one plain [`Combatant`] record. An
//! [`Enemy`] adds an attack cooldown on top of it; both expose the shared
//! capabilities through the small [`Fighter`] trait.

use crate::types::{Attribute, BASE_ATTACK_POWER};

/// Identity, HP and attack power shared by every combatant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combatant {
    id: u32,
    attribute: Attribute,
    max_hp: u32,
    current_hp: u32,
    attack_power: u32,
}

impl Combatant {
    pub fn new(id: u32, attribute: Attribute, max_hp: u32) -> Self {
        Self {
            id,
            attribute,
            max_hp,
            current_hp: max_hp,
            attack_power: BASE_ATTACK_POWER,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn current_hp(&self) -> u32 {
        self.current_hp
    }

    pub fn attack_power(&self) -> u32 {
        self.attack_power
    }

    /// HP never drops below zero
    pub fn take_damage(&mut self, amount: u32) {
        self.current_hp = self.current_hp.saturating_sub(amount);
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Restore to full HP
    pub fn reset(&mut self) {
        self.current_hp = self.max_hp;
    }

    pub fn calculate_damage_output(&self, combo_multiplier: u32) -> u32 {
        self.attack_power.saturating_mul(combo_multiplier)
    }
}

/// Shared capability set of characters and enemies
pub trait Fighter {
    fn stats(&self) -> &Combatant;
    fn stats_mut(&mut self) -> &mut Combatant;

    fn id(&self) -> u32 {
        self.stats().id()
    }

    fn is_alive(&self) -> bool {
        self.stats().is_alive()
    }

    fn take_damage(&mut self, amount: u32) {
        self.stats_mut().take_damage(amount);
    }
}

/// Player-side combatant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    stats: Combatant,
    /// Opaque key owned by the presentation layer
    icon_ref: String,
}

impl Character {
    /// Create a party member whose max HP is an even share of `total_party_hp`.
    ///
    /// A selected count of zero falls back to the whole pool.
    pub fn for_party(
        id: u32,
        attribute: Attribute,
        total_party_hp: u32,
        selected_count: u32,
    ) -> Self {
        let max_hp = if selected_count > 0 {
            total_party_hp / selected_count
        } else {
            total_party_hp
        };
        Self {
            stats: Combatant::new(id, attribute, max_hp),
            icon_ref: format!("character/ID{}", id),
        }
    }

    /// Attribute for a roster slot ID. IDs 1-5 map in attribute order; anything
    /// else falls back to Water.
    pub fn attribute_for_id(id: u32) -> Attribute {
        match id {
            1 => Attribute::Water,
            2 => Attribute::Fire,
            3 => Attribute::Earth,
            4 => Attribute::Light,
            5 => Attribute::Dark,
            _ => Attribute::Water,
        }
    }

    pub fn icon_ref(&self) -> &str {
        &self.icon_ref
    }

    pub fn reset(&mut self) {
        self.stats.reset();
    }
}

impl Fighter for Character {
    fn stats(&self) -> &Combatant {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut Combatant {
        &mut self.stats
    }
}

/// Enemy combatant with an attack cooldown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    stats: Combatant,
    icon_ref: String,
    cooldown_counter: u32,
    cooldown_default: u32,
}

impl Enemy {
    pub fn new(
        id: u32,
        attribute: Attribute,
        max_hp: u32,
        cooldown_default: u32,
        icon_ref: impl Into<String>,
    ) -> Self {
        Self {
            stats: Combatant::new(id, attribute, max_hp),
            icon_ref: icon_ref.into(),
            cooldown_counter: cooldown_default,
            cooldown_default,
        }
    }

    pub fn icon_ref(&self) -> &str {
        &self.icon_ref
    }

    pub fn cooldown_counter(&self) -> u32 {
        self.cooldown_counter
    }

    pub fn cooldown_default(&self) -> u32 {
        self.cooldown_default
    }

    /// Count one turn down. When the counter runs out, attack `target` and reload
    /// the cooldown. Returns the damage dealt, if an attack landed.
    ///
    /// At most one attack per call.
    pub fn on_new_turn(&mut self, target: &mut Combatant) -> Option<u32> {
        self.cooldown_counter = self.cooldown_counter.saturating_sub(1);
        if self.cooldown_counter > 0 {
            return None;
        }
        self.cooldown_counter = self.cooldown_default;
        self.perform_attack(target)
    }

    /// Hit `target` for this enemy's attack power. Dead targets are skipped.
    pub fn perform_attack(&self, target: &mut Combatant) -> Option<u32> {
        if !target.is_alive() {
            return None;
        }
        let damage = self.stats.attack_power();
        target.take_damage(damage);
        Some(damage)
    }

    /// Restore HP and reload the cooldown
    pub fn reset(&mut self) {
        self.stats.reset();
        self.cooldown_counter = self.cooldown_default;
    }
}

impl Fighter for Enemy {
    fn stats(&self) -> &Combatant {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut Combatant {
        &mut self.stats
    }
}
