//! Snapshot module - read-only battle state for presentation layers

use crate::board::Board;
use crate::combatant::{Character, Enemy, Fighter};
use crate::gem::Gem;
use crate::types::{Attribute, BattlePhase, EffectStatus, GemState, BOARD_COLS, BOARD_ROWS};

/// One gem as a renderer sees it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GemView {
    pub attribute: Attribute,
    pub effect: EffectStatus,
    pub row: u8,
    pub col: u8,
    pub state: GemState,
    pub x: f32,
    pub y: f32,
}

impl From<&Gem> for GemView {
    fn from(gem: &Gem) -> Self {
        let pos = gem.position();
        Self {
            attribute: gem.attribute(),
            effect: gem.effect_status(),
            row: gem.row(),
            col: gem.col(),
            state: gem.state(),
            x: pos.x,
            y: pos.y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnemyView {
    pub id: u32,
    pub attribute: Attribute,
    pub current_hp: u32,
    pub max_hp: u32,
    pub cooldown_counter: u32,
    pub cooldown_default: u32,
    pub icon_ref: String,
}

impl From<&Enemy> for EnemyView {
    fn from(enemy: &Enemy) -> Self {
        let stats = enemy.stats();
        Self {
            id: stats.id(),
            attribute: stats.attribute(),
            current_hp: stats.current_hp(),
            max_hp: stats.max_hp(),
            cooldown_counter: enemy.cooldown_counter(),
            cooldown_default: enemy.cooldown_default(),
            icon_ref: enemy.icon_ref().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterView {
    pub id: u32,
    pub attribute: Attribute,
    pub current_hp: u32,
    pub max_hp: u32,
    pub icon_ref: String,
}

impl From<&Character> for CharacterView {
    fn from(character: &Character) -> Self {
        let stats = character.stats();
        Self {
            id: stats.id(),
            attribute: stats.attribute(),
            current_hp: stats.current_hp(),
            max_hp: stats.max_hp(),
            icon_ref: character.icon_ref().to_string(),
        }
    }
}

/// Read-only copy of everything a presentation layer renders
#[derive(Debug, Clone, PartialEq)]
pub struct BattleSnapshot {
    /// 0 = empty, 1..=5 = attribute index + 1
    pub board: [[u8; BOARD_COLS]; BOARD_ROWS],
    pub gems: Vec<GemView>,
    pub enemies: Vec<EnemyView>,
    pub party: Vec<CharacterView>,
    pub phase: BattlePhase,
    pub paused: bool,
    pub mission_id: Option<u32>,
    pub wave_index: usize,
    pub wave_count: usize,
    pub countdown_ms: u32,
    pub turn: u32,
    pub seed: u32,
}

impl BattleSnapshot {
    /// Refill the board part from `board`, reusing the gem buffer
    pub(crate) fn fill_board(&mut self, board: &Board) {
        board.write_u8_grid(&mut self.board);
        self.gems.clear();
        self.gems.extend(board.gems().map(GemView::from));
    }

    /// The player can act right now
    pub fn playable(&self) -> bool {
        self.phase == BattlePhase::PlayerTurn && !self.paused
    }

    pub fn party_hp(&self) -> u32 {
        self.party.iter().map(|c| c.current_hp).sum()
    }
}

impl Default for BattleSnapshot {
    fn default() -> Self {
        Self {
            board: [[0u8; BOARD_COLS]; BOARD_ROWS],
            gems: Vec::new(),
            enemies: Vec::new(),
            party: Vec::new(),
            phase: BattlePhase::Idle,
            paused: false,
            mission_id: None,
            wave_index: 0,
            wave_count: 0,
            countdown_ms: 0,
            turn: 0,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gem_view_copies_gem_state() {
        let gem = Gem::new(Attribute::Fire, 2, 3);
        let view = GemView::from(&gem);
        assert_eq!(view.attribute, Attribute::Fire);
        assert_eq!(view.effect, EffectStatus::Normal);
        assert_eq!((view.row, view.col), (2, 3));
        assert_eq!(view.state, GemState::Idle);
        assert_eq!((view.x, view.y), (270.0, 180.0));
    }

    #[test]
    fn test_playable_needs_player_turn_and_no_pause() {
        let mut snap = BattleSnapshot::default();
        assert!(!snap.playable());
        snap.phase = BattlePhase::PlayerTurn;
        assert!(snap.playable());
        snap.paused = true;
        assert!(!snap.playable());
    }
}
