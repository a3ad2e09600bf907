//! WebSocket session handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS (refused while draining)
//! - Register the connection and announce its id
//! - Lifecycle: ping + idle timeout + graceful shutdown
//! - Cheap policy first, then decode-once, then allowlist, then dispatch
//! - Always run the disconnect sweep before the id is unregistered

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::Instrument;

use classroom_core::error::ClassroomError;
use classroom_core::protocol::ServerEvent;

use crate::app_state::AppState;
use crate::policy::PolicyDecision;
use crate::realtime::{Connection, ConnectionId, RealtimeCore, RealtimeCtx};
use crate::transport::codec::{decode, frame_len, Inbound};

/// How long queued frames may take to flush once the session ends.
const WRITER_FLUSH: Duration = Duration::from_secs(1);

pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    if app.is_draining() {
        return (StatusCode::SERVICE_UNAVAILABLE, "draining").into_response();
    }

    ws.on_upgrade(move |socket| {
        let conn = ConnectionId::generate();
        let span = tracing::info_span!("session", conn = %conn);
        run_session(app, conn, socket).instrument(span)
    })
}

fn send_error(core: &RealtimeCore, conn: &ConnectionId, code: &'static str, msg: String) {
    if let Err(e) = core.send_to_connection(conn, &ServerEvent::Error { code, msg }) {
        tracing::debug!(error = %e, "error reply not sent");
    }
}

fn close_message(code: u16, reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code,
        reason: Cow::Borrowed(reason),
    }))
}

async fn run_session(app: AppState, conn: ConnectionId, socket: WebSocket) {
    let core = app.realtime();
    let dispatcher = app.dispatcher();
    let policy = app.policy();
    let metrics = app.metrics();
    let gw = &app.cfg().gateway;

    let (out_tx, mut out_rx) = mpsc::channel::<Message>(gw.outbound_queue);
    let (mut ws_tx, mut ws_rx) = socket.split();

    core.connections.insert(conn.clone(), Connection { tx: out_tx.clone() });
    metrics.ws_upgrades.inc(&[]);
    metrics.connections_active.inc(&[]);
    tracing::info!("connected");

    // Writer owns the sink so a slow socket never stalls the reader.
    let mut writer = tokio::spawn(
        async move {
            while let Some(m) = out_rx.recv().await {
                let closing = matches!(m, Message::Close(_));
                if ws_tx.send(m).await.is_err() || closing {
                    break;
                }
            }
            let _ = ws_tx.close().await;
        }
        .in_current_span(),
    );
    let mut writer_done = false;

    if let Err(e) = core.send_to_connection(
        &conn,
        &ServerEvent::Connected {
            socket_id: conn.to_string(),
        },
    ) {
        tracing::warn!(error = %e, "failed to announce connection id");
    }

    let ping_every = Duration::from_millis(gw.ping_interval_ms);
    let idle_timeout = Duration::from_millis(gw.idle_timeout_ms);
    let mut ping_tick = tokio::time::interval_at(Instant::now() + ping_every, ping_every);
    ping_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut shutdown_rx = app.shutdown_rx();
    let mut limiter = policy.new_connection_limiter();
    let mut last_activity = Instant::now();

    let reason: &'static str = loop {
        tokio::select! {
            _ = &mut writer => {
                writer_done = true;
                break "socket write failed";
            }

            incoming = ws_rx.next() => {
                let Some(Ok(msg)) = incoming else { break "client gone"; };
                last_activity = Instant::now();

                if matches!(msg, Message::Text(_) | Message::Binary(_)) {
                    let decision = policy.check_frame(frame_len(&msg), &mut limiter);
                    if decision != PolicyDecision::Pass {
                        metrics
                            .policy_decisions
                            .inc(&[("stage", "frame"), ("decision", decision.label())]);
                    }
                    match decision {
                        PolicyDecision::Pass => {}
                        PolicyDecision::Drop => continue,
                        PolicyDecision::Reject { code, msg } => {
                            send_error(&core, &conn, code.as_str(), msg.to_string());
                            continue;
                        }
                        PolicyDecision::Close { code, msg } => {
                            send_error(&core, &conn, code.as_str(), msg.to_string());
                            let _ = out_tx.try_send(close_message(close_code::SIZE, msg));
                            break "policy close";
                        }
                    }
                }

                let event = match decode(msg) {
                    Ok(Inbound::Event(ev)) => ev,
                    Ok(Inbound::Ping(payload)) => {
                        let _ = out_tx.try_send(Message::Pong(payload));
                        continue;
                    }
                    Ok(Inbound::Pong) => continue,
                    Ok(Inbound::Close) => break "client close",
                    Err(e) => {
                        metrics.decode_errors.inc(&[("code", e.client_code().as_str())]);
                        tracing::debug!(error = %e, "frame rejected");
                        send_error(&core, &conn, e.client_code().as_str(), e.to_string());
                        continue;
                    }
                };

                let name = event.name();
                match policy.check_event(name) {
                    PolicyDecision::Pass => {}
                    decision => {
                        metrics
                            .policy_decisions
                            .inc(&[("stage", "event"), ("decision", decision.label())]);
                        if let PolicyDecision::Reject { code, msg } = decision {
                            send_error(&core, &conn, code.as_str(), msg.to_string());
                        }
                        continue;
                    }
                }

                metrics.events.inc(&[("event", name)]);
                let started = Instant::now();
                let ctx = RealtimeCtx::new(conn.clone(), Arc::clone(&core));
                let res = dispatcher.dispatch(ctx, event).await;
                metrics.dispatch_duration.observe(&[("event", name)], started.elapsed());

                if let Err(e) = res {
                    report_service_error(&app, &core, &conn, name, &e);
                }
            }

            _ = ping_tick.tick() => {
                let _ = out_tx.try_send(Message::Ping(Vec::new()));
            }

            _ = tokio::time::sleep_until(last_activity + idle_timeout) => {
                let _ = out_tx.try_send(close_message(close_code::AWAY, "idle timeout"));
                break "idle timeout";
            }

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    let bye = close_message(close_code::AWAY, "server shutting down");
                    let _ = out_tx.try_send(bye);
                    break "server shutdown";
                }
            }
        }
    };

    // Sweep first: notifications still resolve through the registry.
    match core.disconnect(&conn) {
        Ok(rooms) => tracing::debug!(rooms = rooms.len(), "rooms reconciled"),
        Err(e) => tracing::error!(error = %e, "disconnect sweep failed"),
    }
    core.connections.remove(&conn);
    metrics.connections_active.dec(&[]);
    drop(out_tx);

    if !writer_done && tokio::time::timeout(WRITER_FLUSH, &mut writer).await.is_err() {
        writer.abort();
    }

    tracing::info!(reason, "disconnected");
}

fn report_service_error(
    app: &AppState,
    core: &RealtimeCore,
    conn: &ConnectionId,
    event: &'static str,
    err: &ClassroomError,
) {
    let code = err.client_code().as_str();
    app.metrics()
        .service_errors
        .inc(&[("event", event), ("code", code)]);

    if err.is_recoverable() {
        tracing::debug!(event, error = %err, "event rejected");
    } else {
        tracing::warn!(event, error = %err, "event handler failed");
    }
    send_error(core, conn, code, err.to_string());
}
