//! TCP server for the battle adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, OutboundMessage};
use crate::types::{BattleAction, Coord, ROSTER_SLOTS};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 16,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("GEM_BATTLE_HOST").unwrap_or(defaults.host);
        let port = env::var("GEM_BATTLE_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("GEM_BATTLE_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
        }
    }

    /// Check if the adapter is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("GEM_BATTLE_DISABLED")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false)
    }

    /// Major version clients must match
    fn major_version(&self) -> &str {
        self.protocol_version
            .split('.')
            .next()
            .unwrap_or(&self.protocol_version)
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub handshaken: bool,
    pub stream_events: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<String>,
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    /// Client allowed to send battle commands
    controller: RwLock<Option<usize>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    /// Sequence numbers must strictly increase per client
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Mark a client handshaken and assign its role
    async fn admit(&self, client_id: usize, seq: u64, stream_events: bool) -> AssignedRole {
        {
            let mut clients = self.clients.write().await;
            if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                client.handshaken = true;
                client.stream_events = stream_events;
                client.last_seq = Some(seq);
            }
        }

        let mut controller = self.controller.write().await;
        match *controller {
            None => {
                *controller = Some(client_id);
                info!("[Adapter] Client {} is now controller", client_id);
                AssignedRole::Controller
            }
            Some(id) if id == client_id => AssignedRole::Controller,
            Some(_) => AssignedRole::Observer,
        }
    }

    async fn remove(&self, client_id: usize) {
        self.clients.write().await.retain(|c| c.id != client_id);
        let mut controller = self.controller.write().await;
        if *controller == Some(client_id) {
            *controller = None;
            info!("[Adapter] Controller {} released", client_id);
        }
    }

    async fn dispatch(&self, msg: OutboundMessage) {
        let clients = self.clients.read().await;
        match msg {
            OutboundMessage::ToClient { client_id, line } => {
                if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                    let _ = c.tx.send(line);
                }
            }
            OutboundMessage::Broadcast { line } => {
                for c in clients.iter().filter(|c| c.handshaken && c.stream_events) {
                    let _ = c.tx.send(line.clone());
                }
            }
        }
    }
}

/// Validate a wire command and turn it into a battle loop command
pub fn map_command(payload: &CommandPayload) -> Result<ClientCommand, (ErrorCode, String)> {
    let coord = |c: &WireCoord| -> Result<Coord, (ErrorCode, String)> {
        let coord = Coord::from(*c);
        if coord.in_bounds() {
            Ok(coord)
        } else {
            Err((
                ErrorCode::InvalidCommand,
                format!("coordinate ({}, {}) is off the board", c.row, c.col),
            ))
        }
    };

    Ok(match payload {
        CommandPayload::InitMission { roster, mission } => {
            let roster: [u32; ROSTER_SLOTS] = roster.as_slice().try_into().map_err(|_| {
                (
                    ErrorCode::InvalidCommand,
                    format!("roster must have {} slots, got {}", ROSTER_SLOTS, roster.len()),
                )
            })?;
            ClientCommand::InitMission {
                roster,
                mission: *mission,
            }
        }
        CommandPayload::Start => ClientCommand::Start,
        CommandPayload::PlayerActed => ClientCommand::Action(BattleAction::PlayerActed),
        CommandPayload::Swap { a, b } => ClientCommand::Swap {
            a: coord(a)?,
            b: coord(b)?,
        },
        // Out-of-range acknowledgments are tolerated; the board skips them.
        CommandPayload::MatchesAnimated { coords } => {
            ClientCommand::MatchesAnimated(coords.iter().copied().map(Coord::from).collect())
        }
        CommandPayload::EnemyAttacksAnimated => {
            ClientCommand::Action(BattleAction::EnemyAttacksAnimated)
        }
        CommandPayload::Pause => ClientCommand::Action(BattleAction::Pause),
        CommandPayload::Resume => ClientCommand::Action(BattleAction::Resume),
        CommandPayload::Surrender => ClientCommand::Action(BattleAction::Surrender),
        CommandPayload::Restart => ClientCommand::Action(BattleAction::Restart),
        CommandPayload::Snapshot => ClientCommand::Snapshot,
    })
}

fn to_line<T: serde::Serialize>(msg: &T) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(line) => Some(line),
        Err(e) => {
            warn!("[Adapter] failed to encode message: {}", e);
            None
        }
    }
}

fn send_error(tx: &mpsc::UnboundedSender<String>, seq: u64, code: ErrorCode, message: &str) {
    if let Some(line) = to_line(&create_error(seq, code, message)) {
        let _ = tx.send(line);
    }
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    info!("[Adapter] TCP server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                state.dispatch(msg).await;
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!("[Adapter] Client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, &state, command_tx).await {
                warn!("[Adapter] Client {} error: {}", client_id, e);
            }
            state.remove(client_id).await;
            info!("[Adapter] Client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: &Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        addr,
        handshaken: false,
        stream_events: false,
        last_seq: None,
        tx: tx.clone(),
    });

    // Writer task: one JSON document per line
    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    send_error(&tx, hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let major = state.config.major_version();
                if hello.protocol_version.split('.').next() != Some(major) {
                    send_error(
                        &tx,
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                let role = state
                    .admit(client_id, hello.seq, hello.requested.stream_events)
                    .await;
                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    role,
                );
                if let Some(line) = to_line(&welcome) {
                    let _ = tx.send(line);
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    send_error(&tx, cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    send_error(&tx, cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                // Observers may only read state
                if cmd.command != CommandPayload::Snapshot && !state.is_controller(client_id).await {
                    send_error(&tx, cmd.seq, ErrorCode::NotController, "Only controller may send commands");
                    continue;
                }

                let command = match map_command(&cmd.command) {
                    Ok(c) => c,
                    Err((code, message)) => {
                        send_error(&tx, cmd.seq, code, &message);
                        continue;
                    }
                };

                // Backpressure: bounded queue. The battle loop acks once applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        command,
                    })
                    .is_err()
                {
                    send_error(&tx, cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            Ok(ParsedMessage::Unknown(msg)) => {
                send_error(&tx, msg.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }

            Err(e) => {
                warn!("[Adapter] Client {} sent invalid message: {}", client_id, e);
                send_error(&tx, 0, ErrorCode::InvalidCommand, &format!("Invalid message: {}", e));
            }
        }
    }

    drop(tx);
    state.remove(client_id).await;
    let _ = write_task.await;
    Ok(())
}
