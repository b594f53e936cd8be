//! Battle session - applies adapter commands to a controller
//!
//! Sits on the sync side of the adapter. Every applied command is acked to its
//! sender; battle events and the resulting observation are broadcast.

use log::{debug, warn};
use serde::Serialize;

use crate::core::{BattleConfig, BattleController, BattleError, BattleSnapshot};
use crate::protocol::{build_observation, create_ack, create_error, create_event, ErrorCode};
use crate::runtime::{ClientCommand, InboundCommand, OutboundMessage};
use crate::types::BattleEvent;

pub struct Session {
    battle: BattleController,
    /// Sequence number for server-originated messages
    seq: u64,
    snapshot: BattleSnapshot,
    events: Vec<BattleEvent>,
}

impl Session {
    pub fn new(config: BattleConfig) -> Self {
        Self {
            battle: BattleController::new(config),
            seq: 0,
            snapshot: BattleSnapshot::default(),
            events: Vec::new(),
        }
    }

    pub fn battle(&self) -> &BattleController {
        &self.battle
    }

    pub fn battle_mut(&mut self) -> &mut BattleController {
        &mut self.battle
    }

    /// Apply one command from the server
    pub fn handle(&mut self, cmd: &InboundCommand) -> Vec<OutboundMessage> {
        let mut out = Vec::new();

        if cmd.command == ClientCommand::Snapshot {
            self.battle.snapshot_into(&mut self.snapshot);
            if let Some(line) = encode(&build_observation(cmd.seq, &self.snapshot)) {
                out.push(OutboundMessage::ToClient {
                    client_id: cmd.client_id,
                    line,
                });
            }
            return out;
        }

        let reply = match self.apply(&cmd.command) {
            Ok(()) => encode(&create_ack(cmd.seq)),
            Err(err) => {
                debug!("command {} rejected: {}", cmd.seq, err);
                encode(&create_error(cmd.seq, ErrorCode::from(err), &err.to_string()))
            }
        };
        if let Some(line) = reply {
            out.push(OutboundMessage::ToClient {
                client_id: cmd.client_id,
                line,
            });
        }

        self.flush(&mut out, true);
        out
    }

    /// Advance the countdown and the animations by one frame
    pub fn pump(&mut self, elapsed_ms: u32) -> Vec<OutboundMessage> {
        let mut out = Vec::new();
        self.battle.tick(elapsed_ms);
        self.battle.animate();
        self.flush(&mut out, false);
        out
    }

    fn apply(&mut self, command: &ClientCommand) -> Result<(), BattleError> {
        match command {
            ClientCommand::InitMission { roster, mission } => self.battle.init(*roster, *mission),
            ClientCommand::Start => self.battle.start_mission(),
            ClientCommand::Swap { a, b } => {
                if !self.battle.swap_gems(*a, *b)? {
                    debug!("swap {:?} <-> {:?} ignored", a, b);
                }
                Ok(())
            }
            ClientCommand::MatchesAnimated(coords) => {
                self.battle.acknowledge_matches(coords).map(|_| ())
            }
            ClientCommand::Action(action) => self.battle.apply_action(*action),
            ClientCommand::Snapshot => Ok(()),
        }
    }

    /// Broadcast pending events, followed by an observation when anything changed
    fn flush(&mut self, out: &mut Vec<OutboundMessage>, changed: bool) {
        self.events.clear();
        self.battle.drain_events_into(&mut self.events);

        for event in &self.events {
            self.seq += 1;
            if let Some(line) = encode(&create_event(self.seq, event)) {
                out.push(OutboundMessage::Broadcast { line });
            }
        }

        if changed || !self.events.is_empty() {
            self.seq += 1;
            self.battle.snapshot_into(&mut self.snapshot);
            if let Some(line) = encode(&build_observation(self.seq, &self.snapshot)) {
                out.push(OutboundMessage::Broadcast { line });
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}

fn encode<T: Serialize>(msg: &T) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(line) => Some(line),
        Err(e) => {
            warn!("[Adapter] failed to encode message: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BattleAction, Coord};

    fn cmd(seq: u64, command: ClientCommand) -> InboundCommand {
        InboundCommand {
            client_id: 1,
            seq,
            command,
        }
    }

    fn lines(msgs: &[OutboundMessage]) -> Vec<serde_json::Value> {
        msgs.iter()
            .map(|m| match m {
                OutboundMessage::ToClient { line, .. } | OutboundMessage::Broadcast { line } => {
                    serde_json::from_str(line).unwrap()
                }
            })
            .collect()
    }

    #[test]
    fn test_init_and_start_are_acked() {
        let mut session = Session::default();
        let out = session.handle(&cmd(
            1,
            ClientCommand::InitMission {
                roster: [1, 2, 0, 0, 0, 0],
                mission: 1,
            },
        ));
        let msgs = lines(&out);
        assert_eq!(msgs[0]["type"], "ack");
        assert_eq!(msgs[0]["seq"], 1);

        let out = session.handle(&cmd(2, ClientCommand::Start));
        let msgs = lines(&out);
        assert_eq!(msgs[0]["type"], "ack");
        assert!(msgs
            .iter()
            .any(|m| m["type"] == "event" && m["event"] == "countdownStarted"));
        let obs = msgs.last().unwrap();
        assert_eq!(obs["type"], "observation");
        assert_eq!(obs["phase"], "playerTurn");
    }

    #[test]
    fn test_battle_errors_map_to_codes() {
        let mut session = Session::default();
        let out = session.handle(&cmd(1, ClientCommand::Start));
        let msgs = lines(&out);
        assert_eq!(msgs[0]["type"], "error");
        assert_eq!(msgs[0]["code"], "not_initialized");

        let out = session.handle(&cmd(
            2,
            ClientCommand::InitMission {
                roster: [1, 0, 0, 0, 0, 0],
                mission: 2,
            },
        ));
        assert_eq!(lines(&out)[0]["code"], "unsupported_mission");
    }

    #[test]
    fn test_snapshot_goes_to_requester_only() {
        let mut session = Session::default();
        let out = session.handle(&InboundCommand {
            client_id: 7,
            seq: 3,
            command: ClientCommand::Snapshot,
        });
        assert_eq!(out.len(), 1);
        match &out[0] {
            OutboundMessage::ToClient { client_id, line } => {
                assert_eq!(*client_id, 7);
                let v: serde_json::Value = serde_json::from_str(line).unwrap();
                assert_eq!(v["type"], "observation");
                assert_eq!(v["seq"], 3);
                assert_eq!(v["phase"], "idle");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_pump_is_quiet_without_events() {
        let mut session = Session::default();
        session.handle(&cmd(
            1,
            ClientCommand::InitMission {
                roster: [1, 0, 0, 0, 0, 0],
                mission: 1,
            },
        ));
        session.handle(&cmd(2, ClientCommand::Start));
        assert!(session.pump(16).is_empty());

        let out = session.pump(10_000);
        assert!(lines(&out)
            .iter()
            .any(|m| m["event"] == "moveTimeUp"));
    }

    #[test]
    fn test_pause_via_action() {
        let mut session = Session::default();
        session.handle(&cmd(
            1,
            ClientCommand::InitMission {
                roster: [1, 0, 0, 0, 0, 0],
                mission: 1,
            },
        ));
        session.handle(&cmd(2, ClientCommand::Start));
        let out = session.handle(&cmd(3, ClientCommand::Action(BattleAction::Pause)));
        let obs = lines(&out).pop().unwrap();
        assert_eq!(obs["paused"], true);
        assert!(session.battle().is_paused());

        let out = session.handle(&cmd(
            4,
            ClientCommand::Swap {
                a: Coord::new(0, 0),
                b: Coord::new(0, 1),
            },
        ));
        let msgs = lines(&out);
        assert_eq!(msgs[0]["type"], "error");
        assert_eq!(msgs[0]["code"], "paused");
        assert_eq!(msgs[0]["seq"], 4);
    }
}
