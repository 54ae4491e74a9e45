//! Wire protocol and WebSocket clients for board synchronization.
//!
//! Messages are JSON text frames tagged by `type`. Every board mutation names
//! the page it acted on by its stable id and carries an [`Origin`] so
//! receivers can drop their own echoes.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod native;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use memory::MemoryTransport;

#[cfg(not(target_arch = "wasm32"))]
pub use native::NativeWebSocket;

#[cfg(target_arch = "wasm32")]
pub use wasm::WasmWebSocket;

use crate::board::PageId;
use crate::stroke::{Stroke, StrokeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Sync errors.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No active connection")]
    TransportUnavailable,
    #[error("Already connected")]
    AlreadyConnected,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Send failed: {0}")]
    Send(String),
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Who produced a mutation: the client's id and its per-client sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origin {
    pub client: Uuid,
    pub seq: u64,
}

/// A change to one page of the board.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardChange {
    StrokeAdded(Stroke),
    StrokesErased(Vec<StrokeId>),
    PageCleared,
    PageAdded,
}

/// A board change addressed to a page and tagged with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardUpdate {
    pub page: PageId,
    pub origin: Origin,
    pub change: BoardChange,
}

/// Messages sent to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join a room
    Join { room: String },
    /// Leave current room
    Leave,
    /// A stroke was committed
    Draw {
        page: PageId,
        origin: Origin,
        stroke: Stroke,
    },
    /// Strokes were erased
    Erase {
        page: PageId,
        origin: Origin,
        removed: Vec<StrokeId>,
    },
    /// A page was cleared
    Clear { page: PageId, origin: Origin },
    /// A page was appended to the board
    PageAdded { page: PageId, origin: Origin },
}

impl ClientMessage {
    /// Wrap a local board update for sending.
    pub fn update(update: BoardUpdate) -> Self {
        let BoardUpdate { page, origin, change } = update;
        match change {
            BoardChange::StrokeAdded(stroke) => ClientMessage::Draw { page, origin, stroke },
            BoardChange::StrokesErased(removed) => ClientMessage::Erase { page, origin, removed },
            BoardChange::PageCleared => ClientMessage::Clear { page, origin },
            BoardChange::PageAdded => ClientMessage::PageAdded { page, origin },
        }
    }

    /// The board update carried by this message, if any.
    pub fn into_update(self) -> Option<BoardUpdate> {
        let (page, origin, change) = match self {
            ClientMessage::Join { .. } | ClientMessage::Leave => return None,
            ClientMessage::Draw { page, origin, stroke } => (page, origin, BoardChange::StrokeAdded(stroke)),
            ClientMessage::Erase { page, origin, removed } => (page, origin, BoardChange::StrokesErased(removed)),
            ClientMessage::Clear { page, origin } => (page, origin, BoardChange::PageCleared),
            ClientMessage::PageAdded { page, origin } => (page, origin, BoardChange::PageAdded),
        };
        Some(BoardUpdate { page, origin, change })
    }
}

/// Messages received from the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirm room join
    Joined { room: String, peer_count: usize },
    /// Peer joined the room
    PeerJoined { peer_id: String },
    /// Peer left the room
    PeerLeft { peer_id: String },
    /// Stroke committed by another peer
    Draw {
        from: String,
        page: PageId,
        origin: Origin,
        stroke: Stroke,
    },
    /// Strokes erased by another peer
    Erase {
        from: String,
        page: PageId,
        origin: Origin,
        removed: Vec<StrokeId>,
    },
    /// Page cleared by another peer
    Clear {
        from: String,
        page: PageId,
        origin: Origin,
    },
    /// Page added by another peer
    PageAdded {
        from: String,
        page: PageId,
        origin: Origin,
    },
    /// Error message
    Error { message: String },
}

impl ServerMessage {
    /// Relay a board update from the connection `from`.
    pub fn relayed(from: String, update: BoardUpdate) -> Self {
        let BoardUpdate { page, origin, change } = update;
        match change {
            BoardChange::StrokeAdded(stroke) => ServerMessage::Draw { from, page, origin, stroke },
            BoardChange::StrokesErased(removed) => ServerMessage::Erase { from, page, origin, removed },
            BoardChange::PageCleared => ServerMessage::Clear { from, page, origin },
            BoardChange::PageAdded => ServerMessage::PageAdded { from, page, origin },
        }
    }
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Events from the WebSocket client
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// Connected to server
    Connected,
    /// Disconnected from server
    Disconnected,
    /// Joined a room
    JoinedRoom { room: String, peer_count: usize },
    /// A peer joined the room
    PeerJoined { peer_id: String },
    /// A peer left the room
    PeerLeft { peer_id: String },
    /// A peer changed the board
    UpdateReceived { from: String, update: BoardUpdate },
    /// Error occurred
    Error { message: String },
}

impl From<ServerMessage> for SyncEvent {
    fn from(msg: ServerMessage) -> Self {
        let (from, page, origin, change) = match msg {
            ServerMessage::Joined { room, peer_count } => {
                return SyncEvent::JoinedRoom { room, peer_count };
            }
            ServerMessage::PeerJoined { peer_id } => return SyncEvent::PeerJoined { peer_id },
            ServerMessage::PeerLeft { peer_id } => return SyncEvent::PeerLeft { peer_id },
            ServerMessage::Error { message } => return SyncEvent::Error { message },
            ServerMessage::Draw { from, page, origin, stroke } => {
                (from, page, origin, BoardChange::StrokeAdded(stroke))
            }
            ServerMessage::Erase { from, page, origin, removed } => {
                (from, page, origin, BoardChange::StrokesErased(removed))
            }
            ServerMessage::Clear { from, page, origin } => (from, page, origin, BoardChange::PageCleared),
            ServerMessage::PageAdded { from, page, origin } => (from, page, origin, BoardChange::PageAdded),
        };
        SyncEvent::UpdateReceived {
            from,
            update: BoardUpdate { page, origin, change },
        }
    }
}

/// Parse a text frame from the server into an event.
pub fn parse_server_frame(text: &str) -> SyncResult<SyncEvent> {
    let msg: ServerMessage = serde_json::from_str(text)?;
    Ok(msg.into())
}

/// A duplex message channel to the relay server.
///
/// Sends are fire-and-forget; inbound traffic is drained with [`Transport::poll_events`].
pub trait Transport {
    /// Connect to a WebSocket server.
    fn connect(&mut self, url: &str) -> SyncResult<()>;

    /// Disconnect from the server.
    fn disconnect(&mut self);

    /// Send a text message.
    fn send(&self, msg: &str) -> SyncResult<()>;

    /// Poll for pending events (non-blocking).
    fn poll_events(&mut self) -> Vec<SyncEvent>;

    /// Get current connection state.
    fn state(&self) -> ConnectionState;

    /// Check if connected.
    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

/// Platform-specific WebSocket client type.
#[cfg(target_arch = "wasm32")]
pub type PlatformWebSocket = WasmWebSocket;

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformWebSocket = NativeWebSocket;
