//! Battle module - the turn and wave state machine
//!
//! The controller owns the board, the party and the wave list. A host drives it
//! with `tick(elapsed_ms)` and answers animation events; everything the host needs
//! to react to comes back as [`BattleEvent`]s from [`BattleController::take_events`].
//!
//! Flow of one turn:
//!
//! ```text
//! PlayerTurn --timeout, matches--> Resolving --ack--> Damaging --> PlayerTurn
//!                                                             \--> WaveCleared
//! PlayerTurn --timeout, none-----> EnemyPhase --> PlayerTurn | WaveCleared | MissionLost
//! WaveCleared --> PlayerTurn (next wave) | MissionWon
//! ```

use log::{debug, info, warn};

use crate::board::{Board, MatchSet};
use crate::combatant::Fighter;
use crate::countdown::Countdown;
use crate::damage::{apply_player_damage, DamagePolicy};
use crate::error::{BattleError, BattleResult};
use crate::mission::{assemble_party, generate_waves, Party, Wave};
use crate::rng::SimpleRng;
use crate::snapshot::{BattleSnapshot, CharacterView, EnemyView};
use crate::types::{
    BattleAction, BattleEvent, BattlePhase, Coord, MOVE_COUNTDOWN_MS, ROSTER_SLOTS,
    TOTAL_PARTY_HP,
};

/// Tunables for one battle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleConfig {
    pub move_countdown_ms: u32,
    pub total_party_hp: u32,
    pub damage_policy: DamagePolicy,
    pub seed: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            move_countdown_ms: MOVE_COUNTDOWN_MS,
            total_party_hp: TOTAL_PARTY_HP,
            damage_policy: DamagePolicy::FocusFirst,
            seed: 1,
        }
    }
}

/// Turn/wave orchestrator
#[derive(Debug, Clone)]
pub struct BattleController {
    config: BattleConfig,
    rng: SimpleRng,
    board: Board,
    selection: Option<[u32; ROSTER_SLOTS]>,
    mission_id: Option<u32>,
    party: Party,
    waves: Vec<Wave>,
    wave_index: usize,
    phase: BattlePhase,
    countdown: Countdown,
    paused: bool,
    /// Matches emitted and not yet acknowledged
    pending: MatchSet,
    events: Vec<BattleEvent>,
    /// Completed enemy phases in this mission
    turn: u32,
}

impl BattleController {
    pub fn new(config: BattleConfig) -> Self {
        Self {
            config,
            rng: SimpleRng::new(config.seed),
            board: Board::new(),
            selection: None,
            mission_id: None,
            party: Party::new(),
            waves: Vec::new(),
            wave_index: 0,
            phase: BattlePhase::Idle,
            countdown: Countdown::new(config.move_countdown_ms),
            paused: false,
            pending: MatchSet::new(),
            events: Vec::new(),
            turn: 0,
        }
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn party(&self) -> &[crate::combatant::Character] {
        &self.party
    }

    pub fn mission_id(&self) -> Option<u32> {
        self.mission_id
    }

    pub fn wave_index(&self) -> usize {
        self.wave_index
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    pub fn current_wave(&self) -> Option<&Wave> {
        self.waves.get(self.wave_index)
    }

    /// Enemies of the wave being fought (empty once the mission is over)
    pub fn current_wave_enemies(&self) -> &[crate::combatant::Enemy] {
        self.current_wave().map(Wave::enemies).unwrap_or(&[])
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn pending_matches(&self) -> &[Coord] {
        &self.pending
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn seed(&self) -> u32 {
        self.rng.seed()
    }

    /// Events raised since the last call, oldest first
    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Same as [`take_events`](Self::take_events) but appends into a caller buffer
    pub fn drain_events_into(&mut self, out: &mut Vec<BattleEvent>) {
        out.append(&mut self.events);
    }

    fn set_phase(&mut self, phase: BattlePhase) {
        if self.phase != phase {
            debug!("battle phase {} -> {}", self.phase.as_str(), phase.as_str());
            self.phase = phase;
        }
    }

    fn emit(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    /// Load a roster (six slots, 0 = empty) and a mission. Clears the board and
    /// rewinds to the first wave; call [`start_mission`](Self::start_mission) to play.
    pub fn init(&mut self, selection: [u32; ROSTER_SLOTS], mission_id: u32) -> BattleResult<()> {
        let waves = generate_waves(mission_id)?;
        let party = assemble_party(selection, self.config.total_party_hp)?;

        self.selection = Some(selection);
        self.mission_id = Some(mission_id);
        self.party = party;
        self.waves = waves;
        self.wave_index = 0;
        self.turn = 0;
        self.paused = false;
        self.pending.clear();
        self.events.clear();
        self.countdown.stop();
        self.board.clear();
        self.set_phase(BattlePhase::Ready);

        info!(
            "mission {} initialised: {} characters, {} waves",
            mission_id,
            self.party.len(),
            self.waves.len()
        );
        Ok(())
    }

    /// Refresh the waves, deal the opening board, then start the first countdown
    pub fn start_mission(&mut self) -> BattleResult<()> {
        let Some(mission_id) = self.mission_id else {
            warn!("start_mission called before init");
            return Err(BattleError::NotInitialized);
        };
        if self.phase != BattlePhase::Ready {
            return Err(BattleError::WrongPhase(self.phase));
        }

        for wave in self.waves.iter_mut() {
            wave.reset();
        }
        self.wave_index = 0;
        self.turn = 0;
        self.board.generate_initial_gems(&mut self.rng);

        info!("mission {} started (seed {})", mission_id, self.rng.seed());
        self.begin_player_turn();
        Ok(())
    }

    fn begin_player_turn(&mut self) {
        self.set_phase(BattlePhase::PlayerTurn);
        self.countdown.start();
        if self.paused {
            // A turn that begins while paused stays frozen until resume
            self.countdown.pause();
        }
        self.emit(BattleEvent::CountdownStarted {
            duration_ms: self.countdown.duration_ms(),
        });
    }

    /// Advance the move timer. Does nothing outside the player turn or while paused.
    pub fn tick(&mut self, elapsed_ms: u32) {
        if self.paused || self.phase != BattlePhase::PlayerTurn {
            return;
        }
        if self.countdown.tick(elapsed_ms) {
            self.resolve_timeout();
        }
    }

    /// Advance gem animations by one step. Returns true while anything moves.
    pub fn animate(&mut self) -> bool {
        self.board.tick_animations()
    }

    /// End the player turn right away, as if the countdown had run out
    pub fn on_move_timeout(&mut self) -> BattleResult<()> {
        if self.phase != BattlePhase::PlayerTurn {
            return Err(BattleError::WrongPhase(self.phase));
        }
        if self.paused {
            return Err(BattleError::Paused);
        }
        self.resolve_timeout();
        Ok(())
    }

    fn resolve_timeout(&mut self) {
        self.countdown.stop();
        self.emit(BattleEvent::MoveTimeUp);

        let matches = self.board.find_all_matches();
        if matches.is_empty() {
            debug!("no matches on timeout, enemies act");
            self.run_enemy_phase();
            return;
        }

        self.board.mark_for_clearing(&matches);
        self.emit(BattleEvent::MatchesFound {
            coords: matches.to_vec(),
            count: matches.len(),
        });
        self.pending = matches;
        self.set_phase(BattlePhase::Resolving);
    }

    /// The presentation finished animating a match. Clears the pending match set
    /// (plus any extra `coords`), refills the board and damages the current wave.
    ///
    /// Returns the damage dealt.
    pub fn acknowledge_matches(&mut self, coords: &[Coord]) -> BattleResult<u32> {
        if self.phase != BattlePhase::Resolving {
            warn!(
                "match acknowledgment ignored during {}",
                self.phase.as_str()
            );
            return Err(BattleError::WrongPhase(self.phase));
        }
        self.set_phase(BattlePhase::Damaging);

        let mut to_clear: Vec<Coord> = self.pending.to_vec();
        for coord in coords {
            if !to_clear.contains(coord) {
                to_clear.push(*coord);
            }
        }
        self.pending.clear();

        let report = self.board.clear_and_refill(&to_clear, &mut self.rng);
        let total = report.total;
        self.emit(BattleEvent::DamageDealt {
            total,
            by_attribute: report.by_attribute,
        });

        let policy = self.config.damage_policy;
        let (hits, defeated) = match self.waves.get_mut(self.wave_index) {
            Some(wave) => {
                let hits = apply_player_damage(wave, total, policy);
                (hits, wave.all_defeated())
            }
            None => (Vec::new(), false),
        };
        for hit in hits {
            self.emit(BattleEvent::EnemyDamaged {
                enemy_id: hit.enemy_id,
                amount: hit.amount,
                remaining_hp: hit.remaining_hp,
            });
        }
        debug!("{} gems cleared, wave defeated: {}", total, defeated);

        if defeated {
            self.advance_wave();
        } else {
            self.begin_player_turn();
        }
        Ok(total)
    }

    fn run_enemy_phase(&mut self) {
        self.set_phase(BattlePhase::EnemyPhase);
        self.turn += 1;

        let Some(wave) = self.waves.get_mut(self.wave_index) else {
            return;
        };
        let mut attacks = Vec::new();
        for enemy in wave.enemies_mut().iter_mut().filter(|e| e.is_alive()) {
            // Fixed priority: first living character in roster order
            let Some(target) = self.party.iter_mut().find(|c| c.is_alive()) else {
                break;
            };
            let target_id = target.id();
            if let Some(damage) = enemy.on_new_turn(target.stats_mut()) {
                attacks.push(BattleEvent::EnemyAttacked {
                    enemy_id: enemy.id(),
                    target_id,
                    damage,
                });
            }
        }
        for attack in attacks {
            self.emit(attack);
        }

        if self.party.iter().all(|c| !c.is_alive()) {
            self.finish(BattlePhase::MissionLost);
            return;
        }

        if self.current_wave().map_or(true, Wave::all_defeated) {
            self.advance_wave();
            return;
        }

        // Fresh board for the next turn, same wave
        self.board.generate_initial_gems(&mut self.rng);
        self.begin_player_turn();
    }

    fn advance_wave(&mut self) {
        self.set_phase(BattlePhase::WaveCleared);
        info!("wave {} cleared", self.wave_index + 1);
        self.emit(BattleEvent::WaveCleared {
            wave: self.wave_index,
        });

        self.wave_index += 1;
        if self.wave_index >= self.waves.len() {
            self.finish(BattlePhase::MissionWon);
            return;
        }

        self.board.generate_initial_gems(&mut self.rng);
        self.begin_player_turn();
    }

    fn finish(&mut self, phase: BattlePhase) {
        self.countdown.stop();
        self.paused = false;
        self.pending.clear();
        self.set_phase(phase);
        match phase {
            BattlePhase::MissionWon => {
                info!("mission won after {} turns", self.turn);
                self.emit(BattleEvent::MissionWon);
            }
            _ => {
                info!("mission lost on wave {}", self.wave_index + 1);
                self.emit(BattleEvent::MissionLost);
            }
        }
    }

    /// Mid-turn activity: restart the countdown. Returns false when ignored.
    pub fn player_acted(&mut self) -> bool {
        if self.paused || self.phase != BattlePhase::PlayerTurn {
            return false;
        }
        self.countdown.restart();
        self.emit(BattleEvent::CountdownStarted {
            duration_ms: self.countdown.duration_ms(),
        });
        true
    }

    /// Sequencing hook for the enemy attack animation; nothing waits on it
    pub fn enemy_attacks_animated(&mut self) {
        debug!("enemy attack animation finished");
    }

    /// Swap two gems during the player turn. A successful swap counts as activity
    /// and restarts the countdown.
    pub fn swap_gems(&mut self, a: Coord, b: Coord) -> BattleResult<bool> {
        if self.phase != BattlePhase::PlayerTurn {
            return Err(BattleError::WrongPhase(self.phase));
        }
        if self.paused {
            return Err(BattleError::Paused);
        }
        let swapped = self.board.swap_gems(a, b);
        if swapped {
            self.player_acted();
        }
        Ok(swapped)
    }

    /// Freeze the countdown. Returns false when there is nothing to pause.
    pub fn pause(&mut self) -> bool {
        if self.paused || !self.in_progress() {
            return false;
        }
        self.paused = true;
        self.countdown.pause();
        debug!("paused with {}ms left", self.countdown.remaining_ms());
        true
    }

    /// Continue from the remaining countdown time
    pub fn resume(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        self.countdown.resume();
        debug!("resumed with {}ms left", self.countdown.remaining_ms());
        true
    }

    /// Give up: the mission ends as lost
    pub fn surrender(&mut self) -> BattleResult<()> {
        if !self.in_progress() {
            return Err(BattleError::WrongPhase(self.phase));
        }
        info!("player surrendered");
        self.finish(BattlePhase::MissionLost);
        Ok(())
    }

    /// Heal the party, restore the waves, deal a new board and play again
    pub fn restart(&mut self) -> BattleResult<()> {
        if self.selection.is_none() || self.mission_id.is_none() {
            return Err(BattleError::NotInitialized);
        }
        for character in self.party.iter_mut() {
            character.reset();
        }
        self.paused = false;
        self.pending.clear();
        self.countdown.stop();
        self.set_phase(BattlePhase::Ready);
        self.start_mission()
    }

    /// A mission has started and is not over yet
    pub fn in_progress(&self) -> bool {
        !matches!(
            self.phase,
            BattlePhase::Idle
                | BattlePhase::Ready
                | BattlePhase::MissionWon
                | BattlePhase::MissionLost
        )
    }

    /// Dispatch a payload-free action
    pub fn apply_action(&mut self, action: BattleAction) -> BattleResult<()> {
        match action {
            BattleAction::PlayerActed => {
                self.player_acted();
            }
            BattleAction::EnemyAttacksAnimated => self.enemy_attacks_animated(),
            BattleAction::Pause => {
                self.pause();
            }
            BattleAction::Resume => {
                self.resume();
            }
            BattleAction::Surrender => self.surrender()?,
            BattleAction::Restart => self.restart()?,
        }
        Ok(())
    }

    pub fn snapshot_into(&self, out: &mut BattleSnapshot) {
        out.fill_board(&self.board);
        out.enemies.clear();
        out.enemies
            .extend(self.current_wave_enemies().iter().map(EnemyView::from));
        out.party.clear();
        out.party.extend(self.party.iter().map(CharacterView::from));
        out.phase = self.phase;
        out.paused = self.paused;
        out.mission_id = self.mission_id;
        out.wave_index = self.wave_index;
        out.wave_count = self.waves.len();
        out.countdown_ms = self.countdown.remaining_ms();
        out.turn = self.turn;
        out.seed = self.rng.seed();
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        let mut s = BattleSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Replace the board (tests and scripted scenarios)
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    #[cfg(test)]
    pub(crate) fn party_mut(&mut self) -> &mut Party {
        &mut self.party
    }

    #[cfg(test)]
    pub(crate) fn current_wave_mut(&mut self) -> Option<&mut Wave> {
        self.waves.get_mut(self.wave_index)
    }
}

impl Default for BattleController {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Attribute::{self, Dark as D, Earth as E, Fire as F, Light as L, Water as W};
    use crate::types::{BOARD_COLS, BOARD_ROWS};

    fn quiet_grid() -> [[Attribute; BOARD_COLS]; BOARD_ROWS] {
        [
            [W, F, E, L, D, W],
            [F, E, L, D, W, F],
            [E, L, D, W, F, E],
            [L, D, W, F, E, L],
            [D, W, F, E, L, D],
        ]
    }

    fn started(config: BattleConfig) -> BattleController {
        let mut battle = BattleController::new(config);
        battle.init([1, 2, 0, 0, 0, 0], 1).unwrap();
        battle.start_mission().unwrap();
        battle.take_events();
        battle
    }

    #[test]
    fn test_init_rejects_bad_input() {
        let mut battle = BattleController::default();
        assert_eq!(
            battle.init([1, 0, 0, 0, 0, 0], 9),
            Err(BattleError::UnsupportedMission(9))
        );
        assert_eq!(battle.phase(), BattlePhase::Idle);
        assert_eq!(battle.init([0; 6], 1), Err(BattleError::EmptyRoster));
        assert_eq!(battle.start_mission(), Err(BattleError::NotInitialized));
    }

    #[test]
    fn test_start_mission_fills_board_and_counts_down() {
        let mut battle = BattleController::default();
        battle.init([1, 2, 0, 0, 0, 0], 1).unwrap();
        assert_eq!(battle.phase(), BattlePhase::Ready);
        assert_eq!(battle.board().occupied_count(), 0);

        battle.start_mission().unwrap();
        assert_eq!(battle.phase(), BattlePhase::PlayerTurn);
        assert!(battle.board().is_full());
        assert_eq!(battle.party().len(), 2);
        assert_eq!(
            battle.take_events(),
            vec![BattleEvent::CountdownStarted { duration_ms: 10_000 }]
        );
    }

    #[test]
    fn test_timeout_with_matches_waits_for_ack() {
        let mut battle = started(BattleConfig::default());
        let mut grid = quiet_grid();
        grid[0] = [W, W, W, F, F, E];
        battle.set_board(Board::from_attributes(grid));

        battle.tick(9_999);
        assert_eq!(battle.phase(), BattlePhase::PlayerTurn);
        battle.tick(1);
        assert_eq!(battle.phase(), BattlePhase::Resolving);

        let events = battle.take_events();
        assert_eq!(events[0], BattleEvent::MoveTimeUp);
        assert_eq!(
            events[1],
            BattleEvent::MatchesFound {
                coords: vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)],
                count: 3,
            }
        );

        // Nothing happens until the presentation acknowledges
        battle.tick(100_000);
        assert_eq!(battle.phase(), BattlePhase::Resolving);

        let dealt = battle.acknowledge_matches(&[]).unwrap();
        assert_eq!(dealt, 3);
        assert_eq!(battle.phase(), BattlePhase::PlayerTurn);
        assert_eq!(battle.current_wave_enemies()[0].stats().current_hp(), 97);
        assert!(battle.board().is_full());
    }

    #[test]
    fn test_timeout_without_matches_runs_enemy_phase() {
        let mut battle = started(BattleConfig::default());
        battle.set_board(Board::from_attributes(quiet_grid()));

        battle.on_move_timeout().unwrap();
        assert_eq!(battle.turn(), 1);
        assert_eq!(battle.phase(), BattlePhase::PlayerTurn);
        // cooldown 3 -> 2, nobody attacks yet
        assert!(battle
            .current_wave_enemies()
            .iter()
            .all(|e| e.cooldown_counter() == 2));
    }

    #[test]
    fn test_enemies_target_first_living_character() {
        let mut battle = started(BattleConfig::default());
        for _ in 0..3 {
            battle.set_board(Board::from_attributes(quiet_grid()));
            battle.on_move_timeout().unwrap();
        }
        // Three enemies with cooldown 3 all strike on the third turn
        assert_eq!(battle.party()[0].stats().current_hp(), 997);
        assert_eq!(battle.party()[1].stats().current_hp(), 1000);

        let attacks = battle
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, BattleEvent::EnemyAttacked { target_id: 1, .. }))
            .count();
        assert_eq!(attacks, 3);
    }

    #[test]
    fn test_party_wiped_loses_mission() {
        let mut battle = started(BattleConfig {
            total_party_hp: 2,
            ..BattleConfig::default()
        });
        for _ in 0..3 {
            if battle.phase().is_terminal() {
                break;
            }
            battle.set_board(Board::from_attributes(quiet_grid()));
            battle.on_move_timeout().unwrap();
        }
        assert_eq!(battle.phase(), BattlePhase::MissionLost);
        assert!(battle.take_events().contains(&BattleEvent::MissionLost));
        assert!(!battle.countdown().is_running());
    }

    #[test]
    fn test_defeating_every_wave_wins() {
        let mut battle = started(BattleConfig::default());
        for wave in 0..3 {
            assert_eq!(battle.wave_index(), wave);
            if let Some(w) = battle.current_wave_mut() {
                for enemy in w.enemies_mut() {
                    let hp = enemy.stats().current_hp();
                    enemy.take_damage(hp - 1);
                }
            }
            let mut grid = quiet_grid();
            grid[4] = [L; BOARD_COLS];
            battle.set_board(Board::from_attributes(grid));
            battle.on_move_timeout().unwrap();
            battle.acknowledge_matches(&[]).unwrap();
        }
        assert_eq!(battle.phase(), BattlePhase::MissionWon);
        let waves_cleared = battle
            .take_events()
            .iter()
            .filter(|e| matches!(e, BattleEvent::WaveCleared { .. }))
            .count();
        assert_eq!(waves_cleared, 3);
        assert!(battle.current_wave_enemies().is_empty());
    }

    #[test]
    fn test_ack_outside_resolving_is_rejected() {
        let mut battle = started(BattleConfig::default());
        assert_eq!(
            battle.acknowledge_matches(&[Coord::new(0, 0)]),
            Err(BattleError::WrongPhase(BattlePhase::PlayerTurn))
        );
    }

    #[test]
    fn test_ack_unions_extra_coordinates() {
        let mut battle = started(BattleConfig::default());
        let mut grid = quiet_grid();
        grid[0] = [W, W, W, F, F, E];
        battle.set_board(Board::from_attributes(grid));
        battle.on_move_timeout().unwrap();

        let dealt = battle
            .acknowledge_matches(&[Coord::new(0, 0), Coord::new(4, 5), Coord::new(8, 8)])
            .unwrap();
        assert_eq!(dealt, 4);
    }

    #[test]
    fn test_player_acted_restarts_countdown() {
        let mut battle = started(BattleConfig::default());
        battle.tick(6_000);
        assert_eq!(battle.countdown().remaining_ms(), 4_000);
        assert!(battle.player_acted());
        assert_eq!(battle.countdown().remaining_ms(), 10_000);
        assert_eq!(battle.phase(), BattlePhase::PlayerTurn);
    }

    #[test]
    fn test_pause_freezes_and_resume_continues() {
        let mut battle = started(BattleConfig::default());
        battle.tick(3_000);
        assert!(battle.pause());
        battle.tick(50_000);
        assert_eq!(battle.countdown().remaining_ms(), 7_000);
        assert!(!battle.player_acted());

        assert!(battle.resume());
        battle.tick(1_000);
        assert_eq!(battle.countdown().remaining_ms(), 6_000);
    }

    #[test]
    fn test_paused_turn_cannot_be_timed_out_or_swapped() {
        let mut battle = started(BattleConfig::default());
        battle.tick(2_000);
        assert!(battle.pause());

        assert_eq!(battle.on_move_timeout(), Err(BattleError::Paused));
        assert_eq!(
            battle.swap_gems(Coord::new(0, 0), Coord::new(0, 1)),
            Err(BattleError::Paused)
        );
        assert_eq!(battle.phase(), BattlePhase::PlayerTurn);
        assert_eq!(battle.turn(), 0);
        assert_eq!(battle.countdown().remaining_ms(), 8_000);
        assert!(battle.take_events().is_empty());

        assert!(battle.resume());
        battle.on_move_timeout().unwrap();
        assert_eq!(battle.take_events()[0], BattleEvent::MoveTimeUp);
    }

    #[test]
    fn test_ack_while_paused_keeps_next_turn_frozen() {
        let mut battle = started(BattleConfig::default());
        let mut grid = quiet_grid();
        grid[0] = [W, W, W, F, F, E];
        battle.set_board(Board::from_attributes(grid));
        battle.on_move_timeout().unwrap();
        assert_eq!(battle.phase(), BattlePhase::Resolving);

        assert!(battle.pause());
        battle.acknowledge_matches(&[]).unwrap();
        assert_eq!(battle.phase(), BattlePhase::PlayerTurn);
        assert!(battle.is_paused());
        assert!(battle.countdown().is_paused());

        battle.tick(50_000);
        assert_eq!(battle.phase(), BattlePhase::PlayerTurn);
        assert_eq!(battle.countdown().remaining_ms(), 10_000);

        assert!(battle.resume());
        battle.tick(4_000);
        assert_eq!(battle.countdown().remaining_ms(), 6_000);
    }

    #[test]
    fn test_restart_restores_wave_enemies() {
        let mut battle = started(BattleConfig::default());
        let mut grid = quiet_grid();
        grid[0] = [W, W, W, F, F, E];
        battle.set_board(Board::from_attributes(grid));
        battle.on_move_timeout().unwrap();
        battle.acknowledge_matches(&[]).unwrap();
        let hurt: u32 = battle
            .current_wave_enemies()
            .iter()
            .map(|e| e.stats().current_hp())
            .sum();
        let full: u32 = battle
            .current_wave_enemies()
            .iter()
            .map(|e| e.stats().max_hp())
            .sum();
        assert!(hurt < full);

        battle.restart().unwrap();
        let restored: u32 = battle
            .current_wave_enemies()
            .iter()
            .map(|e| e.stats().current_hp())
            .sum();
        assert_eq!(restored, full);
        assert_eq!(battle.wave_index(), 0);
    }

    #[test]
    fn test_surrender_and_restart() {
        let mut battle = started(BattleConfig::default());
        battle.party_mut()[0].take_damage(10);
        battle.surrender().unwrap();
        assert_eq!(battle.phase(), BattlePhase::MissionLost);
        assert_eq!(
            battle.surrender(),
            Err(BattleError::WrongPhase(BattlePhase::MissionLost))
        );

        battle.restart().unwrap();
        assert_eq!(battle.phase(), BattlePhase::PlayerTurn);
        assert_eq!(battle.wave_index(), 0);
        assert_eq!(battle.party()[0].stats().current_hp(), 1000);
    }

    #[test]
    fn test_restart_requires_init() {
        let mut battle = BattleController::default();
        assert_eq!(battle.restart(), Err(BattleError::NotInitialized));
    }

    #[test]
    fn test_swap_counts_as_activity() {
        let mut battle = started(BattleConfig::default());
        battle.set_board(Board::from_attributes(quiet_grid()));
        battle.tick(5_000);
        assert_eq!(battle.swap_gems(Coord::new(0, 0), Coord::new(0, 1)), Ok(true));
        assert_eq!(battle.countdown().remaining_ms(), 10_000);
        assert_eq!(battle.board().attribute_at(Coord::new(0, 0)), Some(F));
    }

    #[test]
    fn test_snapshot_reports_current_wave() {
        let battle = started(BattleConfig::default());
        let snap = battle.snapshot();
        assert_eq!(snap.phase, BattlePhase::PlayerTurn);
        assert_eq!(snap.enemies.len(), 3);
        assert_eq!(snap.enemies[0].id, 101);
        assert_eq!(snap.party.len(), 2);
        assert_eq!(snap.party_hp(), 2000);
        assert_eq!(snap.gems.len(), 30);
        assert_eq!(snap.wave_count, 3);
        assert!(snap.playable());
    }
}
