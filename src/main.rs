//! Gem battle runner (default binary).
//!
//! `run` plays a mission headlessly and prints the report.
//! `serve` exposes the battle over the TCP adapter for an external renderer.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn, LevelFilter};

use gem_battle::adapter::{Adapter, ServerConfig, Session};
use gem_battle::core::{BattleConfig, BattleController, DamagePolicy};
use gem_battle::engine::{HeadlessHost, HostOptions, Outcome};
use gem_battle::logging;
use gem_battle::types::{MOVE_COUNTDOWN_MS, ROSTER_SLOTS, TICK_MS, TOTAL_PARTY_HP};

/// Turn-based match-3 battle engine
#[derive(Parser, Debug)]
#[command(name = "gem-battle")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level: off, error, warn, info, debug, trace (default: $GEM_BATTLE_LOG or info)
    #[arg(long, global = true, value_parser = parse_level)]
    log_level: Option<LevelFilter>,

    #[command(subcommand)]
    command: Commands,
}

/// Battle settings shared by both commands
#[derive(clap::Args, Debug)]
struct BattleArgs {
    /// Random seed for every generated gem
    #[arg(short, long, default_value_t = 1)]
    seed: u32,

    /// Move countdown in milliseconds
    #[arg(long, default_value_t = MOVE_COUNTDOWN_MS)]
    countdown_ms: u32,

    /// Party HP split across the selected characters
    #[arg(long, default_value_t = TOTAL_PARTY_HP)]
    party_hp: u32,

    /// Damage policy: focus or split
    #[arg(long, default_value = "focus", value_parser = parse_policy)]
    policy: DamagePolicy,
}

impl BattleArgs {
    fn config(&self) -> BattleConfig {
        BattleConfig {
            move_countdown_ms: self.countdown_ms,
            total_party_hp: self.party_hp,
            damage_policy: self.policy,
            seed: self.seed,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a mission without a presentation layer
    Run {
        /// Mission id
        #[arg(short, long, default_value_t = 1)]
        mission: u32,

        /// Roster slot ids, comma separated (0 = empty slot)
        #[arg(short, long, default_value = "1,2,3,4,5,0", value_parser = parse_roster)]
        roster: [u32; ROSTER_SLOTS],

        /// End each turn as soon as the board settles
        #[arg(long)]
        fast: bool,

        /// Give up after this many frames
        #[arg(long, default_value_t = 10_000_000)]
        max_ticks: u64,

        #[command(flatten)]
        battle: BattleArgs,
    },

    /// Serve the battle over TCP (line-delimited JSON)
    Serve {
        /// Override GEM_BATTLE_PORT
        #[arg(short, long)]
        port: Option<u16>,

        #[command(flatten)]
        battle: BattleArgs,
    },
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    logging::parse_level(s).ok_or_else(|| format!("unknown log level '{}'", s))
}

fn parse_policy(s: &str) -> Result<DamagePolicy, String> {
    DamagePolicy::from_str(s).ok_or_else(|| format!("unknown damage policy '{}'", s))
}

fn parse_roster(s: &str) -> Result<[u32; ROSTER_SLOTS], String> {
    let ids = s
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid roster '{}': {}", s, e))?;
    let mut roster = [0u32; ROSTER_SLOTS];
    if ids.len() > ROSTER_SLOTS {
        return Err(format!("roster has at most {} slots", ROSTER_SLOTS));
    }
    roster[..ids.len()].copy_from_slice(&ids);
    Ok(roster)
}

fn main() -> Result<()> {
    let args = Args::parse();
    if !logging::init(args.log_level.unwrap_or_else(logging::level_from_env)) {
        warn!("stderr logger not installed, another logger is active");
    }

    match args.command {
        Commands::Run {
            mission,
            roster,
            fast,
            max_ticks,
            battle,
        } => run(mission, roster, fast, max_ticks, battle.config()),
        Commands::Serve { port, battle } => serve(port, battle.config()),
    }
}

fn run(
    mission: u32,
    roster: [u32; ROSTER_SLOTS],
    fast: bool,
    max_ticks: u64,
    config: BattleConfig,
) -> Result<()> {
    let options = HostOptions {
        fast_forward: fast,
        max_ticks,
        ..HostOptions::default()
    };
    let mut host = HeadlessHost::new(BattleController::new(config), options);
    host.start(roster, mission)
        .map_err(|e| anyhow!("cannot start mission {}: {}", mission, e))?;

    let report = host.run_to_end();
    print!("{}", report);
    if report.outcome == Outcome::Aborted {
        return Err(anyhow!("mission did not finish within {} frames", max_ticks));
    }
    Ok(())
}

fn serve(port: Option<u16>, config: BattleConfig) -> Result<()> {
    let mut server = ServerConfig::from_env();
    if let Some(port) = port {
        server.port = port;
    }
    let mut adapter = Adapter::start(server)?;
    info!("serving battle on {}", adapter.local_addr());

    let mut session = Session::new(config);
    let tick = Duration::from_millis(u64::from(TICK_MS));
    let mut last_tick = Instant::now();

    loop {
        while let Some(cmd) = adapter.try_recv() {
            adapter.send_all(session.handle(&cmd));
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick {
            last_tick = Instant::now();
            let ms = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);
            adapter.send_all(session.pump(ms));
        } else {
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roster_pads_empty_slots() {
        assert_eq!(parse_roster("1,2"), Ok([1, 2, 0, 0, 0, 0]));
        assert_eq!(parse_roster("1, 2, 3, 4, 5, 6"), Ok([1, 2, 3, 4, 5, 6]));
        assert!(parse_roster("1,2,3,4,5,6,7").is_err());
        assert!(parse_roster("a").is_err());
    }

    #[test]
    fn test_cli_parses_run() {
        let args = Args::try_parse_from([
            "gem-battle",
            "run",
            "--roster",
            "1,2",
            "--policy",
            "split",
            "--fast",
        ])
        .unwrap();
        match args.command {
            Commands::Run {
                roster,
                fast,
                battle,
                ..
            } => {
                assert_eq!(roster, [1, 2, 0, 0, 0, 0]);
                assert!(fast);
                assert_eq!(battle.policy, DamagePolicy::SplitEvenly);
                assert_eq!(battle.countdown_ms, 10_000);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
