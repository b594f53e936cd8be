//! Error types for battle operations

use thiserror::Error;

use crate::types::BattlePhase;

/// Errors the battle controller reports to its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BattleError {
    /// Only mission 1 has wave data
    #[error("unsupported mission id {0}")]
    UnsupportedMission(u32),
    /// Every roster slot was empty
    #[error("roster has no selected characters")]
    EmptyRoster,
    /// `start_mission`/`restart` called before a successful `init`
    #[error("no mission has been initialised")]
    NotInitialized,
    /// Operation not allowed in the current phase
    #[error("not allowed during {}", .0.as_str())]
    WrongPhase(BattlePhase),
    /// The battle is paused; only `resume` moves it on
    #[error("battle is paused")]
    Paused,
}

impl BattleError {
    /// Stable machine-readable code (used on the wire)
    pub fn code(self) -> &'static str {
        match self {
            BattleError::UnsupportedMission(_) => "unsupported_mission",
            BattleError::EmptyRoster => "empty_roster",
            BattleError::NotInitialized => "not_initialized",
            BattleError::WrongPhase(_) => "wrong_phase",
            BattleError::Paused => "paused",
        }
    }
}

/// Result type alias for battle operations
pub type BattleResult<T> = Result<T, BattleError>;
