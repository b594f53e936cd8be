//! Adapter - remote presentation layer over TCP with a JSON protocol
//!
//! A renderer (or a bot) connects over TCP, receives battle events and state
//! observations, and sends back the signals the controller waits for: match
//! acknowledgments, swaps, pause/resume and so on.
//!
//! # Protocol Overview
//!
//! **Line-delimited JSON** over TCP:
//!
//! 1. **Connection**: Client connects to the TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller;
//!    later clients are observers until the controller disconnects
//! 4. **Streaming**: Every battle event is broadcast as an `event` message,
//!    followed by an `observation` with the full battle state
//! 5. **Commanding**: The controller sends `command` messages; each one is
//!    answered with `ack` or `error` once the battle loop has applied it
//!
//! # Commands
//!
//! `init_mission`, `start`, `player_acted`, `swap`, `matches_animated`,
//! `enemy_attacks_animated`, `pause`, `resume`, `surrender`, `restart`, and
//! `snapshot` (allowed for observers too).
//!
//! # Environment Variables
//!
//! - `GEM_BATTLE_HOST`: Bind address (default: "127.0.0.1")
//! - `GEM_BATTLE_PORT`: Port number (default: 7878, 0 picks a free port)
//! - `GEM_BATTLE_MAX_PENDING`: Command queue depth before `backpressure` errors
//! - `GEM_BATTLE_DISABLED`: Set to "1" or "true" to disable the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":0,"client":{"name":"renderer","version":"0.1.0"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":...,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Client -> Server: {"type":"command","seq":2,"cmd":"init_mission","roster":[1,2,3,0,0,0],"mission":1}
//! Server -> Client: {"type":"ack","seq":2,"ts":...,"status":"ok"}
//! Client -> Server: {"type":"command","seq":3,"cmd":"start"}
//! Server -> Client: {"type":"ack","seq":3,...}
//! Server -> Client: {"type":"event","seq":1,...,"event":"countdownStarted","duration_ms":10000}
//! Server -> Client: {"type":"observation","seq":2,...,"phase":"playerTurn",...}
//! ```
//!
//! Commands are acked with the client's `seq`; server-originated messages carry
//! the server's own sequence.

pub mod protocol;
pub mod runtime;
pub mod server;
pub mod session;

pub use gem_battle_core as core;
pub use gem_battle_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, OutboundMessage};
pub use server::*;
pub use session::Session;
