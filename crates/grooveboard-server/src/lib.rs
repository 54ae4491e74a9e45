//! GrooveBoard WebSocket Relay Server
//!
//! A relay that forwards board mutations between clients in the same room.
//! The server keeps no board state: late joiners start from an empty board.
//!
//! ## Protocol
//!
//! Messages are JSON text frames tagged by `type`:
//! ```json
//! { "type": "join", "room": "room-id" }
//! { "type": "draw", "page": "<uuid>", "origin": { "client": "<uuid>", "seq": 1 }, "stroke": { ... } }
//! { "type": "erase", "page": "<uuid>", "origin": { ... }, "removed": ["<uuid>"] }
//! { "type": "clear", "page": "<uuid>", "origin": { ... } }
//! ```
//! Mutations are relayed to every other member of the sender's room with an
//! added `from` field naming the sending connection.

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use grooveboard_core::sync::{ClientMessage, ServerMessage};
use std::{collections::HashSet, net::SocketAddr, sync::Arc};
use tokio::sync::broadcast::{self, error::RecvError};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default per-room broadcast channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Relay settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Address the HTTP/WebSocket listener binds to.
    pub bind: SocketAddr,
    /// Messages buffered per room before slow receivers start dropping them.
    pub channel_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3030)),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// A message on a room channel, tagged with the sending connection.
type RoomEvent = (String, ServerMessage);

/// Room state
struct Room {
    /// Broadcast channel for this room
    tx: broadcast::Sender<RoomEvent>,
    /// Connected peer IDs
    peers: HashSet<String>,
}

impl Room {
    fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            peers: HashSet::new(),
        }
    }
}

/// Shared application state
pub struct AppState {
    /// Active rooms
    rooms: DashMap<String, Room>,
    channel_capacity: usize,
}

impl AppState {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of members in a room.
    pub fn peer_count(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map_or(0, |room| room.peers.len())
    }

    /// Add peer to room
    fn join_room(&self, room_id: &str, peer_id: &str) -> (broadcast::Receiver<RoomEvent>, usize) {
        let capacity = self.channel_capacity;
        let mut room = self
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Room::new(capacity));
        room.peers.insert(peer_id.to_string());
        let rx = room.tx.subscribe();
        let peer_count = room.peers.len();
        (rx, peer_count)
    }

    /// Remove peer from room
    fn leave_room(&self, room_id: &str, peer_id: &str) {
        if let Some(mut room) = self.rooms.get_mut(room_id) {
            room.peers.remove(peer_id);
            // Clean up empty rooms
            if room.peers.is_empty() {
                drop(room);
                self.rooms.remove_if(room_id, |_, room| room.peers.is_empty());
            }
        }
    }

    /// Broadcast message to room
    fn broadcast(&self, room_id: &str, from: &str, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(room_id) {
            let _ = room.tx.send((from.to_string(), msg));
        }
    }

    /// Leave the room and tell the remaining members.
    fn depart(&self, room_id: &str, peer_id: &str) {
        self.leave_room(room_id, peer_id);
        self.broadcast(room_id, peer_id, ServerMessage::PeerLeft {
            peer_id: peer_id.to_string(),
        });
        info!("Peer {} left room {}", peer_id, room_id);
    }
}

/// Build the relay's HTTP router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Index page
async fn index() -> &'static str {
    "GrooveBoard Relay Server - Connect via WebSocket at /ws"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn encode(msg: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            warn!("Failed to encode {:?}: {}", msg, e);
            None
        }
    }
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let peer_id = Uuid::new_v4().to_string();
    info!("New connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let mut current_room: Option<String> = None;
    let mut room_rx: Option<broadcast::Receiver<RoomEvent>> = None;

    loop {
        tokio::select! {
            // Handle incoming messages from client
            msg = receiver.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue, // Ignore binary, ping/pong
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", peer_id, e);
                        break;
                    }
                };

                let client_msg = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => client_msg,
                    Err(e) => {
                        warn!("Invalid message from {}: {}", peer_id, e);
                        let err = ServerMessage::Error {
                            message: format!("Invalid message: {}", e),
                        };
                        if let Some(frame) = encode(&err) {
                            let _ = sender.send(frame).await;
                        }
                        continue;
                    }
                };

                match client_msg {
                    ClientMessage::Join { room } => {
                        // Leave current room if any
                        if let Some(old_room) = current_room.take() {
                            state.depart(&old_room, &peer_id);
                        }

                        // Join new room
                        let (rx, peer_count) = state.join_room(&room, &peer_id);
                        room_rx = Some(rx);
                        current_room = Some(room.clone());

                        // Send joined confirmation
                        let joined = ServerMessage::Joined { room: room.clone(), peer_count };
                        if let Some(frame) = encode(&joined) {
                            if sender.send(frame).await.is_err() {
                                break;
                            }
                        }

                        // Notify others
                        state.broadcast(&room, &peer_id, ServerMessage::PeerJoined {
                            peer_id: peer_id.clone(),
                        });

                        info!("Peer {} joined room {} ({} peers)", peer_id, room, peer_count);
                    }
                    ClientMessage::Leave => {
                        if let Some(room) = current_room.take() {
                            state.depart(&room, &peer_id);
                        }
                        room_rx = None;
                    }
                    mutation => {
                        let (Some(room), Some(update)) = (current_room.as_ref(), mutation.into_update()) else {
                            debug!("Dropping mutation from {} outside a room", peer_id);
                            continue;
                        };
                        state.broadcast(room, &peer_id, ServerMessage::relayed(peer_id.clone(), update));
                    }
                }
            }

            // Handle broadcast messages from room
            event = async {
                match &mut room_rx {
                    Some(rx) => rx.recv().await,
                    // No room joined, just wait forever
                    None => std::future::pending().await,
                }
            } => {
                match event {
                    Ok((from, server_msg)) => {
                        // Don't echo back to sender
                        if from == peer_id {
                            continue;
                        }
                        if let Some(frame) = encode(&server_msg) {
                            if sender.send(frame).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Peer {} fell behind; {} message(s) dropped", peer_id, skipped);
                    }
                    Err(RecvError::Closed) => {
                        room_rx = None;
                    }
                }
            }
        }
    }

    // Cleanup on disconnect
    if let Some(room) = current_room {
        state.depart(&room, &peer_id);
    }
    info!("Connection closed: {}", peer_id);
}
