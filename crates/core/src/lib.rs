//! Core battle logic - pure, deterministic, and testable
//!
//! This crate contains the match-3 rules and the turn/wave state machine. It has
//! **no dependencies** on rendering, input, networking, or wall-clock time, making it:
//!
//! - **Deterministic**: Same seed produces the same boards and the same mission
//! - **Testable**: Every rule is covered by unit tests next to the code
//! - **Portable**: A terminal host, a GUI or a TCP client can all drive it
//!
//! # Module Structure
//!
//! - [`gem`]: Single tile with its swap/fall/clear animation state machine
//! - [`board`]: 5x6 grid, match detection, clearing, gravity and refill
//! - [`combatant`]: HP pools for characters and enemies, enemy cooldowns
//! - [`mission`]: Wave tables and party assembly
//! - [`damage`]: Which enemies absorb the player's damage
//! - [`countdown`]: Pausable move timer
//! - [`battle`]: The controller that ties everything together
//! - [`rng`]: Seeded LCG used for every random gem
//!
//! # Game Rules
//!
//! - **Matches**: 3 or more same-attribute gems in a row or column, taken at full length
//! - **Damage**: One point per cleared gem, no attribute weighting
//! - **Turn end**: When the countdown expires, matches resolve; with no matches the
//!   enemies act instead
//! - **Enemies**: Each enemy attacks the first living character when its cooldown runs out
//! - **Waves**: A wave is cleared once every enemy in it is down; clearing the last wave
//!   wins the mission, losing every character loses it
//!
//! # Example
//!
//! ```
//! use gem_battle_core::{BattleConfig, BattleController};
//! use gem_battle_types::{BattleEvent, BattlePhase};
//!
//! let mut battle = BattleController::new(BattleConfig::default());
//! battle.init([1, 2, 0, 0, 0, 0], 1).unwrap();
//! battle.start_mission().unwrap();
//! assert_eq!(battle.phase(), BattlePhase::PlayerTurn);
//!
//! // Run the countdown out
//! battle.tick(10_000);
//! let events = battle.take_events();
//! assert!(events.contains(&BattleEvent::MoveTimeUp));
//! ```
//!
//! # Timing
//!
//! Hosts call [`BattleController::tick`](battle::BattleController::tick) with the
//! elapsed milliseconds and [`BattleController::animate`](battle::BattleController::animate)
//! once per animation frame (16ms cadence). The controller never waits on animation
//! itself: clearing only happens when the host calls `acknowledge_matches`.

pub mod battle;
pub mod board;
pub mod combatant;
pub mod countdown;
pub mod damage;
pub mod error;
pub mod gem;
pub mod mission;
pub mod rng;
pub mod snapshot;

pub use gem_battle_types as types;

// Re-export commonly used types for convenience
pub use battle::{BattleConfig, BattleController};
pub use board::{Board, ClearReport, MatchSet};
pub use combatant::{Character, Combatant, Enemy, Fighter};
pub use countdown::Countdown;
pub use damage::{apply_player_damage, DamagePolicy, Hit};
pub use error::{BattleError, BattleResult};
pub use gem::{Gem, PixelPos};
pub use mission::{assemble_party, generate_waves, Party, Wave};
pub use rng::SimpleRng;
pub use snapshot::{BattleSnapshot, CharacterView, EnemyView, GemView};
