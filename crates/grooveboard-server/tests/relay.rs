//! End-to-end relay behaviour over real WebSocket connections.

use futures_util::{SinkExt, StreamExt};
use grooveboard_core::Stroke;
use grooveboard_core::sync::{ClientMessage, Origin, ServerMessage};
use grooveboard_server::{AppState, DEFAULT_CHANNEL_CAPACITY, router};
use kurbo::Point;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use uuid::Uuid;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn corner_stroke() -> Stroke {
    Stroke::new(
        vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
        "#000000",
        4.0,
    )
    .unwrap()
}

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(Arc::new(AppState::new(DEFAULT_CHANNEL_CAPACITY)));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("ws://{}/ws", addr)
}

async fn connect(url: &str) -> Client {
    let (ws, _) = connect_async(url).await.unwrap();
    ws
}

async fn send(ws: &mut Client, msg: &ClientMessage) {
    let json = serde_json::to_string(msg).unwrap();
    ws.send(Message::Text(json.into())).await.unwrap();
}

async fn recv(ws: &mut Client) -> ServerMessage {
    loop {
        let frame = timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .unwrap()
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn assert_silent(ws: &mut Client) {
    let next = timeout(Duration::from_millis(200), ws.next()).await;
    assert!(next.is_err(), "unexpected frame: {:?}", next);
}

async fn join(ws: &mut Client, room: &str) -> usize {
    send(ws, &ClientMessage::Join { room: room.to_string() }).await;
    match recv(ws).await {
        ServerMessage::Joined { room: joined, peer_count } => {
            assert_eq!(joined, room);
            peer_count
        }
        other => panic!("expected joined, got {:?}", other),
    }
}

#[tokio::test]
async fn test_draw_reaches_room_peers_only() {
    let url = start_server().await;
    let mut alice = connect(&url).await;
    let mut bob = connect(&url).await;
    let mut carol = connect(&url).await;

    assert_eq!(join(&mut alice, "studio").await, 1);
    assert_eq!(join(&mut bob, "studio").await, 2);
    assert!(matches!(recv(&mut alice).await, ServerMessage::PeerJoined { .. }));
    assert_eq!(join(&mut carol, "other").await, 1);

    let stroke = corner_stroke();
    let page = Uuid::new_v4();
    let origin = Origin { client: Uuid::new_v4(), seq: 1 };
    send(&mut alice, &ClientMessage::Draw { page, origin, stroke: stroke.clone() }).await;

    match recv(&mut bob).await {
        ServerMessage::Draw { page: got_page, origin: got_origin, stroke: got, .. } => {
            assert_eq!(got_page, page);
            assert_eq!(got_origin, origin);
            assert_eq!(got, stroke);
        }
        other => panic!("expected draw, got {:?}", other),
    }

    // No echo to the sender, nothing across rooms.
    assert_silent(&mut alice).await;
    assert_silent(&mut carol).await;
}

#[tokio::test]
async fn test_erase_and_clear_are_relayed() {
    let url = start_server().await;
    let mut alice = connect(&url).await;
    let mut bob = connect(&url).await;
    join(&mut alice, "studio").await;
    join(&mut bob, "studio").await;
    recv(&mut alice).await; // peer_joined

    let page = Uuid::new_v4();
    let removed = vec![Uuid::new_v4()];
    send(&mut bob, &ClientMessage::Erase {
        page,
        origin: Origin { client: Uuid::new_v4(), seq: 1 },
        removed: removed.clone(),
    })
    .await;
    send(&mut bob, &ClientMessage::Clear {
        page,
        origin: Origin { client: Uuid::new_v4(), seq: 2 },
    })
    .await;

    match recv(&mut alice).await {
        ServerMessage::Erase { removed: got, .. } => assert_eq!(got, removed),
        other => panic!("expected erase, got {:?}", other),
    }
    assert!(matches!(recv(&mut alice).await, ServerMessage::Clear { .. }));
}

#[tokio::test]
async fn test_malformed_frame_gets_error() {
    let url = start_server().await;
    let mut alice = connect(&url).await;
    alice.send(Message::Text("{\"type\":\"bogus\"}".into())).await.unwrap();
    assert!(matches!(recv(&mut alice).await, ServerMessage::Error { .. }));
}

#[tokio::test]
async fn test_peer_left_on_disconnect() {
    let url = start_server().await;
    let mut alice = connect(&url).await;
    let mut bob = connect(&url).await;
    join(&mut alice, "studio").await;
    join(&mut bob, "studio").await;
    recv(&mut alice).await; // peer_joined

    bob.close(None).await.unwrap();
    assert!(matches!(recv(&mut alice).await, ServerMessage::PeerLeft { .. }));
}
