//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the battle engine.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, headless hosts, the wire adapter).
//!
//! # Board Dimensions
//!
//! - **Rows**: 5 (indexed 0-4, top to bottom)
//! - **Columns**: 6 (indexed 0-5, left to right)
//!
//! # Timing and Animation Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed host cadence (~60 FPS) |
//! | `MOVE_COUNTDOWN_MS` | 10000 | Player turn countdown |
//! | `TILE_SIZE` | 90.0 | Gem cell size in pixels |
//! | `SWAP_STEP` | 16.0 | Swap animation pixels per tick |
//! | `FALL_STEP` | 16.0 | Fall animation pixels per tick |
//!
//! # Examples
//!
//! ```
//! use gem_battle_types::{Attribute, BattleAction, Coord, BOARD_COLS, BOARD_ROWS};
//!
//! let attr = Attribute::from_str("fire").unwrap();
//! assert_eq!(attr, Attribute::Fire);
//! assert_eq!(Attribute::from_index(7), Attribute::Earth);
//!
//! let action = BattleAction::from_str("playerActed").unwrap();
//! assert_eq!(action, BattleAction::PlayerActed);
//!
//! assert!(Coord::new(4, 5).in_bounds());
//! assert!(!Coord::new(BOARD_ROWS as u8, 0).in_bounds());
//! assert_eq!(BOARD_COLS, 6);
//! ```

/// Board rows
pub const BOARD_ROWS: usize = 5;
/// Board columns
pub const BOARD_COLS: usize = 6;
/// Total number of cells on the board
pub const BOARD_CELLS: usize = BOARD_ROWS * BOARD_COLS;

/// Shortest run that counts as a match
pub const MIN_MATCH_LEN: usize = 3;

/// Gem cell size in pixels
pub const TILE_SIZE: f32 = 90.0;
/// Swap animation speed (pixels per animation tick)
pub const SWAP_STEP: f32 = 16.0;
/// Fall animation speed (pixels per animation tick)
pub const FALL_STEP: f32 = 16.0;

/// Timing constants (in milliseconds)
pub const TICK_MS: u32 = 16;
pub const MOVE_COUNTDOWN_MS: u32 = 10_000;

/// Party constants
pub const ROSTER_SLOTS: usize = 6;
pub const TOTAL_PARTY_HP: u32 = 2000;
pub const BASE_ATTACK_POWER: u32 = 1;

/// Number of gem attributes
pub const ATTRIBUTE_COUNT: usize = 5;

/// Elemental attribute shared by gems, characters and enemies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Water,
    Fire,
    Earth,
    Light,
    Dark,
}

impl Attribute {
    pub const ALL: [Attribute; ATTRIBUTE_COUNT] = [
        Attribute::Water,
        Attribute::Fire,
        Attribute::Earth,
        Attribute::Light,
        Attribute::Dark,
    ];

    /// Map any integer onto an attribute (wraps modulo 5)
    pub fn from_index(i: u32) -> Self {
        Self::ALL[(i as usize) % ATTRIBUTE_COUNT]
    }

    /// Position in [`Attribute::ALL`]
    pub fn index(self) -> usize {
        match self {
            Attribute::Water => 0,
            Attribute::Fire => 1,
            Attribute::Earth => 2,
            Attribute::Light => 3,
            Attribute::Dark => 4,
        }
    }

    /// Parse attribute from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "water" => Some(Attribute::Water),
            "fire" => Some(Attribute::Fire),
            "earth" => Some(Attribute::Earth),
            "light" => Some(Attribute::Light),
            "dark" => Some(Attribute::Dark),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Water => "water",
            Attribute::Fire => "fire",
            Attribute::Earth => "earth",
            Attribute::Light => "light",
            Attribute::Dark => "dark",
        }
    }
}

/// Status effect carried by a gem. Reserved for enemy skills; no rule mutates it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EffectStatus {
    #[default]
    Normal,
    Burning,
    Weathered,
}

impl EffectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectStatus::Normal => "normal",
            EffectStatus::Burning => "burning",
            EffectStatus::Weathered => "weathered",
        }
    }
}

/// Gem animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GemState {
    #[default]
    Idle,
    Swapping,
    Falling,
    /// Terminal: the gem waits to be removed from the board
    Clearing,
}

impl GemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GemState::Idle => "idle",
            GemState::Swapping => "swapping",
            GemState::Falling => "falling",
            GemState::Clearing => "clearing",
        }
    }

    /// True while the gem is travelling towards its target position
    pub fn is_moving(&self) -> bool {
        matches!(self, GemState::Swapping | GemState::Falling)
    }
}

/// Grid coordinate (row 0 is the top row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Check that the coordinate addresses a board cell
    pub fn in_bounds(&self) -> bool {
        (self.row as usize) < BOARD_ROWS && (self.col as usize) < BOARD_COLS
    }

    /// Row-major flat index, None when out of bounds
    pub fn index(&self) -> Option<usize> {
        if !self.in_bounds() {
            return None;
        }
        Some(self.row as usize * BOARD_COLS + self.col as usize)
    }
}

/// Battle controller phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BattlePhase {
    /// Nothing loaded yet
    #[default]
    Idle,
    /// Mission initialised, waiting for start
    Ready,
    /// Countdown running
    PlayerTurn,
    /// Matches emitted, waiting for the animation acknowledgment
    Resolving,
    /// Applying clear + refill + damage
    Damaging,
    /// Enemies acting
    EnemyPhase,
    /// Current wave defeated, loading the next one
    WaveCleared,
    MissionWon,
    MissionLost,
}

impl BattlePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BattlePhase::Idle => "idle",
            BattlePhase::Ready => "ready",
            BattlePhase::PlayerTurn => "playerTurn",
            BattlePhase::Resolving => "resolving",
            BattlePhase::Damaging => "damaging",
            BattlePhase::EnemyPhase => "enemyPhase",
            BattlePhase::WaveCleared => "waveCleared",
            BattlePhase::MissionWon => "missionWon",
            BattlePhase::MissionLost => "missionLost",
        }
    }

    /// Mission is over (won or lost)
    pub fn is_terminal(&self) -> bool {
        matches!(self, BattlePhase::MissionWon | BattlePhase::MissionLost)
    }
}

/// Payload-free signals the presentation layer sends back to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleAction {
    /// Mid-turn activity: restart the countdown
    PlayerActed,
    /// Enemy attack animation finished (sequencing hook)
    EnemyAttacksAnimated,
    Pause,
    Resume,
    Surrender,
    Restart,
}

impl BattleAction {
    /// Parse action from string (for the wire protocol)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "playeracted" => Some(BattleAction::PlayerActed),
            "enemyattacksanimated" => Some(BattleAction::EnemyAttacksAnimated),
            "pause" => Some(BattleAction::Pause),
            "resume" => Some(BattleAction::Resume),
            "surrender" => Some(BattleAction::Surrender),
            "restart" => Some(BattleAction::Restart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BattleAction::PlayerActed => "playerActed",
            BattleAction::EnemyAttacksAnimated => "enemyAttacksAnimated",
            BattleAction::Pause => "pause",
            BattleAction::Resume => "resume",
            BattleAction::Surrender => "surrender",
            BattleAction::Restart => "restart",
        }
    }
}

/// Events raised by the controller for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleEvent {
    CountdownStarted { duration_ms: u32 },
    /// Countdown expired; input should be locked while the turn resolves
    MoveTimeUp,
    MatchesFound { coords: Vec<Coord>, count: usize },
    DamageDealt {
        total: u32,
        by_attribute: [u32; ATTRIBUTE_COUNT],
    },
    EnemyDamaged {
        enemy_id: u32,
        amount: u32,
        remaining_hp: u32,
    },
    EnemyAttacked {
        enemy_id: u32,
        target_id: u32,
        damage: u32,
    },
    /// `wave` is the index of the wave that was just defeated
    WaveCleared { wave: usize },
    MissionWon,
    MissionLost,
}

impl BattleEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            BattleEvent::CountdownStarted { .. } => "countdownStarted",
            BattleEvent::MoveTimeUp => "moveTimeUp",
            BattleEvent::MatchesFound { .. } => "matchesFound",
            BattleEvent::DamageDealt { .. } => "damageDealt",
            BattleEvent::EnemyDamaged { .. } => "enemyDamaged",
            BattleEvent::EnemyAttacked { .. } => "enemyAttacked",
            BattleEvent::WaveCleared { .. } => "waveCleared",
            BattleEvent::MissionWon => "missionWon",
            BattleEvent::MissionLost => "missionLost",
        }
    }
}
