//! Protocol module - JSON message types for the battle adapter
//!
//! Line-delimited JSON. Every message has `type` and `seq` (sender-side sequence
//! number); `ts` is a millisecond timestamp and optional on inbound messages.

use serde::{Deserialize, Serialize};

use crate::core::{BattleError, BattleSnapshot};
use crate::types::{Attribute, BattleEvent, Coord, ATTRIBUTE_COUNT, BOARD_COLS, BOARD_ROWS};

pub const PROTOCOL_VERSION: &str = "1.0.0";
pub const GAME_ID: &str = "gem-battle";

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HelloType {
    #[serde(rename = "hello")]
    #[default]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CommandType {
    #[serde(rename = "command")]
    #[default]
    Command,
}

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    /// Receive battle events and observations as they happen
    #[serde(default = "default_true")]
    pub stream_events: bool,
}

impl Default for RequestedCapabilities {
    fn default() -> Self {
        Self {
            stream_events: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Grid coordinate on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireCoord {
    pub row: u8,
    pub col: u8,
}

impl From<Coord> for WireCoord {
    fn from(value: Coord) -> Self {
        Self {
            row: value.row,
            col: value.col,
        }
    }
}

impl From<WireCoord> for Coord {
    fn from(value: WireCoord) -> Self {
        Coord::new(value.row, value.col)
    }
}

/// Command message; the `cmd` field selects the payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    #[serde(flatten)]
    pub command: CommandPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum CommandPayload {
    InitMission { roster: Vec<u32>, mission: u32 },
    Start,
    PlayerActed,
    Swap { a: WireCoord, b: WireCoord },
    MatchesAnimated {
        #[serde(default)]
        coords: Vec<WireCoord>,
    },
    EnemyAttacksAnimated,
    Pause,
    Resume,
    Surrender,
    Restart,
    Snapshot,
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "event")]
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    InvalidCommand,
    Backpressure,
    UnsupportedMission,
    EmptyRoster,
    NotInitialized,
    WrongPhase,
    Paused,
}

impl From<BattleError> for ErrorCode {
    fn from(value: BattleError) -> Self {
        match value {
            BattleError::UnsupportedMission(_) => ErrorCode::UnsupportedMission,
            BattleError::EmptyRoster => ErrorCode::EmptyRoster,
            BattleError::NotInitialized => ErrorCode::NotInitialized,
            BattleError::WrongPhase(_) => ErrorCode::WrongPhase,
            BattleError::Paused => ErrorCode::Paused,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignedRole {
    Controller,
    Observer,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    pub game_id: String,
    pub commands: Vec<String>,
}

/// Acknowledgment for an applied command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeLower {
    Water,
    Fire,
    Earth,
    Light,
    Dark,
}

impl From<Attribute> for AttributeLower {
    fn from(value: Attribute) -> Self {
        match value {
            Attribute::Water => AttributeLower::Water,
            Attribute::Fire => AttributeLower::Fire,
            Attribute::Earth => AttributeLower::Earth,
            Attribute::Light => AttributeLower::Light,
            Attribute::Dark => AttributeLower::Dark,
        }
    }
}

/// Cleared gems per attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeTally {
    pub water: u32,
    pub fire: u32,
    pub earth: u32,
    pub light: u32,
    pub dark: u32,
}

impl From<[u32; ATTRIBUTE_COUNT]> for AttributeTally {
    fn from(v: [u32; ATTRIBUTE_COUNT]) -> Self {
        Self {
            water: v[Attribute::Water.index()],
            fire: v[Attribute::Fire.index()],
            earth: v[Attribute::Earth.index()],
            light: v[Attribute::Light.index()],
            dark: v[Attribute::Dark.index()],
        }
    }
}

/// Battle event payload; `event` carries the event name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum EventPayload {
    CountdownStarted {
        duration_ms: u32,
    },
    MoveTimeUp,
    MatchesFound {
        coords: Vec<WireCoord>,
        count: usize,
    },
    DamageDealt {
        total: u32,
        by_attribute: AttributeTally,
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
    WaveCleared {
        wave: usize,
    },
    MissionWon,
    MissionLost,
}

impl From<&BattleEvent> for EventPayload {
    fn from(value: &BattleEvent) -> Self {
        match value {
            BattleEvent::CountdownStarted { duration_ms } => EventPayload::CountdownStarted {
                duration_ms: *duration_ms,
            },
            BattleEvent::MoveTimeUp => EventPayload::MoveTimeUp,
            BattleEvent::MatchesFound { coords, count } => EventPayload::MatchesFound {
                coords: coords.iter().copied().map(WireCoord::from).collect(),
                count: *count,
            },
            BattleEvent::DamageDealt {
                total,
                by_attribute,
            } => EventPayload::DamageDealt {
                total: *total,
                by_attribute: AttributeTally::from(*by_attribute),
            },
            BattleEvent::EnemyDamaged {
                enemy_id,
                amount,
                remaining_hp,
            } => EventPayload::EnemyDamaged {
                enemy_id: *enemy_id,
                amount: *amount,
                remaining_hp: *remaining_hp,
            },
            BattleEvent::EnemyAttacked {
                enemy_id,
                target_id,
                damage,
            } => EventPayload::EnemyAttacked {
                enemy_id: *enemy_id,
                target_id: *target_id,
                damage: *damage,
            },
            BattleEvent::WaveCleared { wave } => EventPayload::WaveCleared { wave: *wave },
            BattleEvent::MissionWon => EventPayload::MissionWon,
            BattleEvent::MissionLost => EventPayload::MissionLost,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub msg_type: EventType,
    pub seq: u64,
    pub ts: u64,
    #[serde(flatten)]
    pub event: EventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardCells {
    pub rows: u8,
    pub cols: u8,
    /// 0 = empty, 1-5 = water, fire, earth, light, dark
    pub cells: [[u8; BOARD_COLS]; BOARD_ROWS],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyObservation {
    pub id: u32,
    pub attribute: AttributeLower,
    pub hp: u32,
    pub max_hp: u32,
    pub cooldown: u32,
    pub cooldown_default: u32,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterObservation {
    pub id: u32,
    pub attribute: AttributeLower,
    pub hp: u32,
    pub max_hp: u32,
    pub icon: String,
}

/// Full battle state (sent on request and after every change)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub phase: String,
    pub playable: bool,
    pub paused: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mission_id: Option<u32>,
    pub wave: usize,
    pub wave_count: usize,
    pub countdown_ms: u32,
    pub turn: u32,
    pub seed: u32,
    pub board: BoardCells,
    pub enemies: Vec<EnemyObservation>,
    pub party: Vec<CharacterObservation>,
}

// ============== Parsing / constructors ==============

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone)]
pub struct UnknownMessage {
    pub seq: u64,
}

pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    struct TypeOnly<'a> {
        #[serde(rename = "type")]
        msg_type: Option<&'a str>,
        seq: Option<u64>,
    }

    let head = serde_json::from_str::<TypeOnly>(json)?;
    match head.msg_type {
        Some("hello") => Ok(ParsedMessage::Hello(serde_json::from_str(json)?)),
        Some("command") => Ok(ParsedMessage::Command(serde_json::from_str(json)?)),
        // Unknown message types are reported, not treated as parse failures.
        _ => Ok(ParsedMessage::Unknown(UnknownMessage {
            seq: head.seq.unwrap_or(0),
        })),
    }
}

pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: "1.0.0".to_string(),
        },
        protocol_version: protocol_version.to_string(),
        requested: RequestedCapabilities::default(),
    }
}

pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    role: AssignedRole,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role,
        game_id: GAME_ID.to_string(),
        commands: [
            "init_mission",
            "start",
            "player_acted",
            "swap",
            "matches_animated",
            "enemy_attacks_animated",
            "pause",
            "resume",
            "surrender",
            "restart",
            "snapshot",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    }
}

pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

pub fn create_event(seq: u64, event: &BattleEvent) -> EventMessage {
    EventMessage {
        msg_type: EventType::Event,
        seq,
        ts: current_timestamp_ms(),
        event: EventPayload::from(event),
    }
}

pub fn build_observation(seq: u64, snap: &BattleSnapshot) -> ObservationMessage {
    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        phase: snap.phase.as_str().to_string(),
        playable: snap.playable(),
        paused: snap.paused,
        mission_id: snap.mission_id,
        wave: snap.wave_index,
        wave_count: snap.wave_count,
        countdown_ms: snap.countdown_ms,
        turn: snap.turn,
        seed: snap.seed,
        board: BoardCells {
            rows: BOARD_ROWS as u8,
            cols: BOARD_COLS as u8,
            cells: snap.board,
        },
        enemies: snap
            .enemies
            .iter()
            .map(|e| EnemyObservation {
                id: e.id,
                attribute: e.attribute.into(),
                hp: e.current_hp,
                max_hp: e.max_hp,
                cooldown: e.cooldown_counter,
                cooldown_default: e.cooldown_default,
                icon: e.icon_ref.clone(),
            })
            .collect(),
        party: snap
            .party
            .iter()
            .map(|c| CharacterObservation {
                id: c.id,
                attribute: c.attribute.into(),
                hp: c.current_hp,
                max_hp: c.max_hp,
                icon: c.icon_ref.clone(),
            })
            .collect(),
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
