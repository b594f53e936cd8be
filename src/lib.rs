//! Gem battle (workspace facade crate).
//!
//! Re-exports the member crates as `gem_battle::{types, core, engine, adapter}` so
//! binaries and integration tests depend on one package.

pub mod logging;

pub use gem_battle_adapter as adapter;
pub use gem_battle_core as core;
pub use gem_battle_engine as engine;
pub use gem_battle_types as types;
