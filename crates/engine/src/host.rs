//! Headless host - drives a battle the way a renderer would
//!
//! Each frame ticks the countdown and the gem animations, waits a fixed number of
//! frames for the "clear" animation of emitted matches, then acknowledges them.
//! No swaps are ever made, so damage only comes from matches that fall into place.

use log::{debug, warn};

use gem_battle_core::{BattleController, BattleResult, Fighter};
use gem_battle_types::{BattleEvent, BattlePhase, ROSTER_SLOTS, TICK_MS};

use crate::report::{MissionReport, Outcome};

/// Frame pacing for [`HeadlessHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostOptions {
    /// Milliseconds fed to `tick` per frame
    pub tick_ms: u32,
    /// Frames the clear animation of a match takes before it is acknowledged
    pub clear_frames: u32,
    /// End the player turn as soon as the board has settled instead of waiting
    /// for the countdown
    pub fast_forward: bool,
    /// Stop (as `Aborted`) after this many frames
    pub max_ticks: u64,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            clear_frames: 12,
            fast_forward: false,
            max_ticks: 10_000_000,
        }
    }
}

pub struct HeadlessHost {
    battle: BattleController,
    options: HostOptions,
    report: MissionReport,
    /// Frames left before the pending matches are acknowledged
    clear_wait: Option<u32>,
    events: Vec<BattleEvent>,
}

impl HeadlessHost {
    pub fn new(battle: BattleController, options: HostOptions) -> Self {
        let seed = battle.seed();
        Self {
            battle,
            options,
            report: MissionReport::new(seed),
            clear_wait: None,
            events: Vec::new(),
        }
    }

    pub fn battle(&self) -> &BattleController {
        &self.battle
    }

    pub fn battle_mut(&mut self) -> &mut BattleController {
        &mut self.battle
    }

    pub fn options(&self) -> &HostOptions {
        &self.options
    }

    pub fn report(&self) -> &MissionReport {
        &self.report
    }

    /// Init and start a mission in one go
    pub fn start(&mut self, selection: [u32; ROSTER_SLOTS], mission_id: u32) -> BattleResult<()> {
        self.battle.init(selection, mission_id)?;
        self.battle.start_mission()?;
        self.report = MissionReport::new(self.battle.seed());
        self.clear_wait = None;
        self.collect_events();
        Ok(())
    }

    /// Run one frame. Returns the events raised during it.
    pub fn step(&mut self) -> &[BattleEvent] {
        self.events.clear();
        self.report.ticks += 1;
        self.report.simulated_ms += u64::from(self.options.tick_ms);

        let settled = !self.battle.animate();

        match self.battle.phase() {
            BattlePhase::PlayerTurn
                if self.options.fast_forward && settled && !self.battle.is_paused() =>
            {
                if let Err(err) = self.battle.on_move_timeout() {
                    warn!("fast-forward timeout rejected: {}", err);
                }
            }
            BattlePhase::PlayerTurn => self.battle.tick(self.options.tick_ms),
            BattlePhase::Resolving => self.step_clear_animation(),
            _ => {}
        }

        self.collect_events();
        &self.events
    }

    fn step_clear_animation(&mut self) {
        let left = self.clear_wait.unwrap_or(self.options.clear_frames);
        if left > 0 {
            self.clear_wait = Some(left - 1);
            return;
        }

        self.clear_wait = None;
        let coords = self.battle.pending_matches().to_vec();
        match self.battle.acknowledge_matches(&coords) {
            Ok(damage) => debug!("acknowledged {} matched gems", damage),
            Err(err) => warn!("match acknowledgment failed: {}", err),
        }
    }

    fn collect_events(&mut self) {
        let start = self.events.len();
        self.battle.drain_events_into(&mut self.events);

        let mut attacked = false;
        for event in &self.events[start..] {
            self.report.record(event);
            attacked |= matches!(event, BattleEvent::EnemyAttacked { .. });
        }
        if attacked {
            // The attack "animation" is instantaneous here
            self.battle.enemy_attacks_animated();
        }
        self.report.turns = self.battle.turn();
        self.report.party_hp = self
            .battle
            .party()
            .iter()
            .map(|c| c.stats().current_hp())
            .sum();
    }

    pub fn is_finished(&self) -> bool {
        self.battle.phase().is_terminal()
    }

    /// Step until the mission ends or the tick limit is reached
    pub fn run_to_end(&mut self) -> MissionReport {
        while !self.is_finished() && self.report.ticks < self.options.max_ticks {
            self.step();
        }
        if !self.is_finished() {
            self.report.outcome = Outcome::Aborted;
        }
        self.report.clone()
    }
}
