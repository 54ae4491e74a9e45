//! Collaboration management for real-time multi-user drawing.
//!
//! This module is the bridge between the local [`Board`] and the relay: it
//! turns local mutations into tagged wire messages and applies the mutations
//! peers send back.

use crate::board::{Board, PageId};
use crate::sync::{BoardChange, BoardUpdate, ClientMessage, Origin, SyncError, SyncEvent, SyncResult};
use uuid::Uuid;

/// Manages room membership, outbound message queueing and inbound update
/// application for one board session.
pub struct CollaborationManager {
    /// Identifies this client in mutation origins.
    client_id: Uuid,
    /// Sequence number of the last mutation this client produced.
    seq: u64,
    /// Whether the transport reported an open connection.
    connected: bool,
    /// Requested room (kept across reconnects).
    room: Option<String>,
    /// Set once the server confirms the join.
    joined: bool,
    peer_count: usize,
    /// Pending outgoing messages (JSON strings).
    outgoing: Vec<String>,
}

impl CollaborationManager {
    /// Create a new collaboration manager with a fresh client id.
    pub fn new() -> Self {
        Self::with_client_id(Uuid::new_v4())
    }

    pub fn with_client_id(client_id: Uuid) -> Self {
        Self {
            client_id,
            seq: 0,
            connected: false,
            room: None,
            joined: false,
            peer_count: 0,
            outgoing: Vec::new(),
        }
    }

    pub fn client_id(&self) -> Uuid {
        self.client_id
    }

    /// Get the current room ID.
    pub fn current_room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    /// Check if the server has confirmed our room membership.
    pub fn is_in_room(&self) -> bool {
        self.joined
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Number of clients in the room, including this one, as last reported.
    pub fn peer_count(&self) -> usize {
        self.peer_count
    }

    /// Request to join a room.
    ///
    /// The join is sent now if connected, otherwise as soon as the transport
    /// reports a connection.
    pub fn join_room(&mut self, room: &str) {
        if self.room.as_deref() == Some(room) {
            return;
        }
        self.leave_room();
        self.room = Some(room.to_string());
        if self.connected {
            self.queue(&ClientMessage::Join { room: room.to_string() });
        }
    }

    /// Request to leave the current room. Queues the leave message.
    pub fn leave_room(&mut self) {
        if self.room.take().is_some() {
            if self.connected {
                self.queue(&ClientMessage::Leave);
            }
            self.joined = false;
            self.peer_count = 0;
        }
    }

    /// Take pending outgoing messages (drains the queue).
    pub fn take_outgoing(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outgoing)
    }

    /// Check if there are pending outgoing messages.
    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    fn queue(&mut self, msg: &ClientMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => self.outgoing.push(json),
            Err(e) => log::error!("Failed to serialize outgoing message: {}", e),
        }
    }

    fn next_origin(&mut self) -> Origin {
        self.seq += 1;
        Origin {
            client: self.client_id,
            seq: self.seq,
        }
    }

    // --- Outbound ---

    /// Queue a local mutation for the room.
    ///
    /// Fails with [`SyncError::TransportUnavailable`] when there is no open
    /// connection or no room; nothing is queued in that case, so the change
    /// is never sent later.
    pub fn broadcast(&mut self, page: PageId, change: BoardChange) -> SyncResult<Origin> {
        if !self.connected || self.room.is_none() {
            return Err(SyncError::TransportUnavailable);
        }
        let origin = self.next_origin();
        let msg = ClientMessage::update(BoardUpdate { page, origin, change });
        self.outgoing.push(serde_json::to_string(&msg)?);
        Ok(origin)
    }

    // --- Inbound ---

    /// Handle one transport event. Returns true if the board changed.
    pub fn handle_event(&mut self, event: SyncEvent, board: &mut Board) -> bool {
        match event {
            SyncEvent::Connected => {
                log::info!("Connected to relay");
                self.connected = true;
                if let Some(room) = self.room.clone() {
                    self.queue(&ClientMessage::Join { room });
                }
                false
            }
            SyncEvent::Disconnected => {
                log::info!("Disconnected from relay");
                self.connected = false;
                self.joined = false;
                self.peer_count = 0;
                // No buffering across a disconnect.
                self.outgoing.clear();
                false
            }
            SyncEvent::JoinedRoom { room, peer_count } => {
                log::info!("Joined room {} ({} peer(s))", room, peer_count);
                self.joined = self.room.as_deref() == Some(room.as_str());
                self.peer_count = peer_count;
                false
            }
            SyncEvent::PeerJoined { peer_id } => {
                log::debug!("Peer {} joined", peer_id);
                self.peer_count += 1;
                false
            }
            SyncEvent::PeerLeft { peer_id } => {
                log::debug!("Peer {} left", peer_id);
                self.peer_count = self.peer_count.saturating_sub(1);
                false
            }
            SyncEvent::Error { message } => {
                log::warn!("Sync error: {}", message);
                false
            }
            SyncEvent::UpdateReceived { from, update } => {
                log::debug!("Update from {}: {:?}", from, update.origin);
                self.apply_update(update, board)
            }
        }
    }

    /// Apply a peer's mutation to the board. Returns true if the board changed.
    ///
    /// Updates are routed by page id, whatever page is active locally. A page
    /// id the board has never seen is adopted as a new trailing page.
    pub fn apply_update(&self, update: BoardUpdate, board: &mut Board) -> bool {
        if update.origin.client == self.client_id {
            log::debug!("Ignoring echo of own update {}", update.origin.seq);
            return false;
        }

        let pages_before = board.len();
        let index = board.insert_page(update.page);
        let adopted = board.len() != pages_before;

        let changed = match update.change {
            BoardChange::PageAdded => false,
            BoardChange::StrokeAdded(stroke) => {
                if !stroke.is_well_formed() {
                    log::warn!(
                        "Dropping malformed remote stroke {} ({} point(s), width {})",
                        stroke.id(),
                        stroke.points().len(),
                        stroke.width()
                    );
                    false
                } else if board.pages()[index].contains(stroke.id()) {
                    false
                } else {
                    board.add_stroke(index, stroke).is_ok()
                }
            }
            BoardChange::StrokesErased(ids) => {
                matches!(board.remove_strokes(index, &ids), Ok(removed) if removed > 0)
            }
            BoardChange::PageCleared => {
                !board.pages()[index].is_empty() && board.clear_page(index).is_ok()
            }
        };

        adopted || changed
    }
}

impl Default for CollaborationManager {
    fn default() -> Self {
        Self::new()
    }
}
