use std::fmt;

use gem_battle_types::BattleEvent;

/// How a headless run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Won,
    Lost,
    /// The tick limit was hit before the mission ended
    Aborted,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Won => "won",
            Outcome::Lost => "lost",
            Outcome::Aborted => "aborted",
        }
    }
}

/// Summary of one mission run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionReport {
    pub outcome: Outcome,
    pub seed: u32,
    pub ticks: u64,
    pub simulated_ms: u64,
    pub turns: u32,
    pub resolutions: u32,
    pub waves_cleared: u32,
    pub gems_cleared: u64,
    pub damage_taken: u64,
    pub party_hp: u32,
}

impl MissionReport {
    pub(crate) fn new(seed: u32) -> Self {
        Self {
            outcome: Outcome::Aborted,
            seed,
            ticks: 0,
            simulated_ms: 0,
            turns: 0,
            resolutions: 0,
            waves_cleared: 0,
            gems_cleared: 0,
            damage_taken: 0,
            party_hp: 0,
        }
    }

    /// Fold one controller event into the running totals
    pub(crate) fn record(&mut self, event: &BattleEvent) {
        match event {
            BattleEvent::MatchesFound { .. } => self.resolutions += 1,
            BattleEvent::DamageDealt { total, .. } => self.gems_cleared += u64::from(*total),
            BattleEvent::EnemyAttacked { damage, .. } => self.damage_taken += u64::from(*damage),
            BattleEvent::WaveCleared { .. } => self.waves_cleared += 1,
            BattleEvent::MissionWon => self.outcome = Outcome::Won,
            BattleEvent::MissionLost => self.outcome = Outcome::Lost,
            BattleEvent::CountdownStarted { .. }
            | BattleEvent::MoveTimeUp
            | BattleEvent::EnemyDamaged { .. } => {}
        }
    }
}

impl fmt::Display for MissionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "outcome:        {}", self.outcome.as_str())?;
        writeln!(f, "seed:           {}", self.seed)?;
        writeln!(f, "waves cleared:  {}", self.waves_cleared)?;
        writeln!(f, "enemy turns:    {}", self.turns)?;
        writeln!(f, "resolutions:    {}", self.resolutions)?;
        writeln!(f, "gems cleared:   {}", self.gems_cleared)?;
        writeln!(f, "damage taken:   {}", self.damage_taken)?;
        writeln!(f, "party hp left:  {}", self.party_hp)?;
        write!(
            f,
            "ticks:          {} ({}ms simulated)",
            self.ticks, self.simulated_ms
        )
    }
}
