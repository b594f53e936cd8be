//! Adapter runtime integration.
//!
//! Bridges the sync battle loop with the async TCP server.

use std::net::SocketAddr;

use anyhow::Context;
use log::{error, info};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};

use crate::server::{run_server, ServerConfig};
use crate::types::{BattleAction, Coord, ROSTER_SLOTS};

/// Command delivered to the battle loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub command: ClientCommand,
}

/// Command payload, validated by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    InitMission {
        roster: [u32; ROSTER_SLOTS],
        mission: u32,
    },
    Start,
    Swap {
        a: Coord,
        b: Coord,
    },
    MatchesAnimated(Vec<Coord>),
    Action(BattleAction),
    Snapshot,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    ToClient { client_id: usize, line: String },
    /// Sent to every handshaken client that streams events
    Broadcast { line: String },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    addr: SocketAddr,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl Adapter {
    /// Start the server on its own runtime and wait until it is listening.
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await {
                error!("[Adapter] server stopped: {:#}", e);
            }
        });

        let addr = ready_rx
            .blocking_recv()
            .context("adapter server failed to start")?;
        info!("[Adapter] ready on {}", addr);

        Ok(Self {
            _rt: rt,
            addr,
            cmd_rx,
            out_tx,
        })
    }

    /// Start the adapter from environment variables.
    ///
    /// Returns None if `GEM_BATTLE_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        if ServerConfig::is_disabled() {
            info!("[Adapter] disabled via GEM_BATTLE_DISABLED");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn send_all(&self, msgs: impl IntoIterator<Item = OutboundMessage>) {
        for msg in msgs {
            self.send(msg);
        }
    }
}
