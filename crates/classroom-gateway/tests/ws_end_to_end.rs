#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use classroom_gateway::app_state::AppState;
use classroom_gateway::config::GatewayConfig;
use classroom_gateway::router::build_router;

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server(cfg: GatewayConfig) -> (SocketAddr, AppState) {
    let state = AppState::new(cfg).unwrap();
    let app = build_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

/// Connect and consume the `connected` greeting. Returns the socket id.
async fn open(addr: SocketAddr) -> (Ws, String) {
    let (mut ws, _) = connect_async(format!("ws://{addr}/socket")).await.unwrap();
    let hello = next_event(&mut ws).await;
    assert_eq!(hello["event"], "connected");
    let id = hello["data"]["socketId"].as_str().unwrap().to_string();
    (ws, id)
}

async fn next_event(ws: &mut Ws) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .unwrap();
        if msg.is_text() {
            return serde_json::from_str(msg.to_text().unwrap()).unwrap();
        }
        if msg.is_close() {
            panic!("connection closed");
        }
    }
}

async fn emit(ws: &mut Ws, event: &str, data: Value) {
    let text = json!({ "event": event, "data": data }).to_string();
    ws.send(Message::text(text)).await.unwrap();
}

#[tokio::test]
async fn join_then_disconnect_over_websocket() {
    let (addr, state) = start_server(GatewayConfig::default()).await;
    let (mut alice, _) = open(addr).await;
    let (mut bob, _) = open(addr).await;

    emit(&mut alice, "join live class", json!({"liveClassId": "lc1", "user": "Alice"})).await;
    assert_eq!(next_event(&mut alice).await["data"], json!(["Alice"]));

    emit(&mut bob, "join live class", json!({"liveClassId": "lc1", "user": "Bob"})).await;
    assert_eq!(next_event(&mut alice).await["data"], json!(["Alice", "Bob"]));
    assert_eq!(next_event(&mut bob).await["data"], json!(["Alice", "Bob"]));

    bob.close(None).await.unwrap();
    let ev = next_event(&mut alice).await;
    assert_eq!(ev["event"], "live class attendees");
    assert_eq!(ev["data"], json!(["Alice"]));

    // Unregistering follows the sweep; give the session task a moment.
    for _ in 0..50 {
        if state.realtime().connections.len() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(state.realtime().connections.len(), 1);
}

#[tokio::test]
async fn teacher_signal_uses_announced_socket_id() {
    let (addr, _state) = start_server(GatewayConfig::default()).await;
    let (mut teacher, _) = open(addr).await;
    let (mut student, student_id) = open(addr).await;

    emit(
        &mut teacher,
        "teacher signal",
        json!({"studentSocketId": student_id, "signal": {"type": "offer", "sdp": "v=0"}}),
    )
    .await;

    let ev = next_event(&mut student).await;
    assert_eq!(ev["event"], "teacher signal");
    assert_eq!(ev["data"]["signal"]["type"], "offer");
}

#[tokio::test]
async fn malformed_frame_gets_error_and_session_survives() {
    let (addr, _state) = start_server(GatewayConfig::default()).await;
    let (mut ws, _) = open(addr).await;

    ws.send(Message::text("not json")).await.unwrap();
    let ev = next_event(&mut ws).await;
    assert_eq!(ev["event"], "error");
    assert_eq!(ev["data"]["code"], "BAD_REQUEST");

    emit(&mut ws, "join live class", json!({"liveClassId": "lc1"})).await;
    let ev = next_event(&mut ws).await;
    assert_eq!(ev["data"]["code"], "INVALID_PAYLOAD");

    emit(&mut ws, "chat message", json!("still here")).await;
    let ev = next_event(&mut ws).await;
    assert_eq!(ev["event"], "chat message");
    assert_eq!(ev["data"], "still here");
}

#[tokio::test]
async fn disallowed_event_is_rejected() {
    let mut cfg = GatewayConfig::default();
    cfg.policy.allowed_events = vec!["join live class".into()];
    let (addr, _state) = start_server(cfg).await;
    let (mut ws, _) = open(addr).await;

    emit(&mut ws, "chat message", json!("hi")).await;
    let ev = next_event(&mut ws).await;
    assert_eq!(ev["event"], "error");
    assert_eq!(ev["data"]["code"], "NOT_ALLOWED");
}

#[tokio::test]
async fn oversized_frame_closes_session() {
    let mut cfg = GatewayConfig::default();
    cfg.policy.max_frame_bytes = 256;
    let (addr, _state) = start_server(cfg).await;
    let (mut ws, _) = open(addr).await;

    emit(&mut ws, "chat message", json!("x".repeat(1024))).await;
    let ev = next_event(&mut ws).await;
    assert_eq!(ev["data"]["code"], "PAYLOAD_TOO_LARGE");

    let closed = tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(Ok(msg)) = ws.next().await {
            if msg.is_close() {
                return true;
            }
        }
        true
    })
    .await
    .unwrap();
    assert!(closed);
}
