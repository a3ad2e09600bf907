use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{timeout, Duration};

use classroom_core::error::{ClassroomError, Result};
use classroom_core::protocol::ServerEvent;

use crate::obs::GatewayMetrics;
use crate::realtime::core::{ConnectionRegistry, RoomTable};
use crate::realtime::types::{ConnectionId, Outgoing, PreparedMsg, QoS};

/// RealtimeCore: connection registry + room table + egress engine.
///
/// One instance per server, created with `AppState`. Room mutations are
/// serialized by the `rooms` mutex; fan-out caused by a mutation is enqueued
/// before the lock is released, so every member observes room snapshots in
/// mutation order.
pub struct RealtimeCore {
    pub connections: Arc<ConnectionRegistry>,
    rooms: Mutex<RoomTable>,
    metrics: Arc<GatewayMetrics>,
}

impl RealtimeCore {
    pub fn new(metrics: Arc<GatewayMetrics>) -> Self {
        Self {
            connections: Arc::new(ConnectionRegistry::new()),
            rooms: Mutex::new(RoomTable::new()),
            metrics,
        }
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    /// Lock the room table. A poisoned lock is reported, never unwrapped.
    pub(crate) fn rooms(&self) -> Result<MutexGuard<'_, RoomTable>> {
        self.rooms
            .lock()
            .map_err(|_| ClassroomError::Internal("room table lock poisoned".into()))
    }

    /// Non-blocking enqueue to one connection. Returns false if it was not delivered.
    pub(crate) fn try_deliver(&self, id: &ConnectionId, prepared: &PreparedMsg) -> bool {
        let Some(conn) = self.connections.get(id) else {
            return false;
        };
        match conn.tx.try_send(prepared.to_ws_message()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.metrics
                    .egress_dropped
                    .inc(&[("event", prepared.event()), ("reason", "full")]);
                tracing::debug!(
                    conn = %id,
                    event = prepared.event(),
                    "outbound queue full, frame dropped"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.metrics
                    .egress_dropped
                    .inc(&[("event", prepared.event()), ("reason", "closed")]);
                false
            }
        }
    }

    /// Lossy fan-out to a set of connections. Returns the number enqueued.
    pub(crate) fn fanout_lossy<'a>(
        &self,
        targets: impl IntoIterator<Item = &'a ConnectionId>,
        prepared: &PreparedMsg,
    ) -> usize {
        targets
            .into_iter()
            .filter(|id| self.try_deliver(id, prepared))
            .count()
    }

    /// Send one event to one connection (lossy). `Ok(false)` if it is gone.
    pub fn send_to_connection(&self, id: &ConnectionId, event: &ServerEvent) -> Result<bool> {
        let prepared = PreparedMsg::prepare(event)?;
        Ok(self.try_deliver(id, &prepared))
    }

    /// Lossy broadcast to a room's members, optionally skipping one.
    pub fn publish_room_lossy(
        &self,
        room: &str,
        event: &ServerEvent,
        except: Option<&ConnectionId>,
    ) -> Result<usize> {
        let prepared = PreparedMsg::prepare(event)?;
        let table = self.rooms()?;
        let members = table.members(room);
        Ok(self.fanout_lossy(
            members.iter().filter(|m| Some(*m) != except),
            &prepared,
        ))
    }

    /// Broadcast to every connected client.
    ///
    /// Reliable QoS awaits every recipient concurrently, each bounded by the
    /// timeout; a slow recipient never delays the others past it.
    pub async fn publish_all(&self, out: Outgoing) -> Result<usize> {
        let prepared = PreparedMsg::prepare(&out.event)?;
        let conns = self.connections.all();

        let timeout_ms = match out.qos {
            QoS::Lossy => {
                return Ok(self.fanout_lossy(conns.iter().map(|(id, _)| id), &prepared));
            }
            QoS::Reliable { timeout_ms } => timeout_ms,
        };

        let mut futs = FuturesUnordered::new();
        for (id, conn) in conns {
            let msg = prepared.to_ws_message();
            futs.push(async move {
                let sent = if timeout_ms > 0 {
                    match timeout(Duration::from_millis(timeout_ms), conn.tx.send(msg)).await {
                        Ok(res) => res.is_ok(),
                        Err(_) => {
                            tracing::debug!(conn = %id, "reliable send timed out");
                            return Delivery::TimedOut;
                        }
                    }
                } else {
                    conn.tx.send(msg).await.is_ok()
                };
                if sent {
                    Delivery::Sent
                } else {
                    Delivery::Closed
                }
            });
        }

        let mut delivered = 0;
        while let Some(d) = futs.next().await {
            match d {
                Delivery::Sent => delivered += 1,
                Delivery::TimedOut => {
                    self.metrics.chat_timeouts.inc(&[("event", prepared.event())])
                }
                Delivery::Closed => self
                    .metrics
                    .egress_dropped
                    .inc(&[("event", prepared.event()), ("reason", "closed")]),
            }
        }
        Ok(delivered)
    }

    /// Current attendee list of a room.
    pub fn attendees(&self, room: &str) -> Result<Vec<String>> {
        Ok(self.rooms()?.attendees(room))
    }

    pub fn room_count(&self) -> usize {
        self.rooms().map(|t| t.room_count()).unwrap_or(0)
    }
}

enum Delivery {
    Sent,
    TimedOut,
    Closed,
}

/// Per-message context passed to services.
#[derive(Clone)]
pub struct RealtimeCtx {
    conn: ConnectionId,
    core: Arc<RealtimeCore>,
}

impl RealtimeCtx {
    pub fn new(conn: ConnectionId, core: Arc<RealtimeCore>) -> Self {
        Self { conn, core }
    }

    /// Connection that sent the event being handled.
    pub fn connection_id(&self) -> &ConnectionId {
        &self.conn
    }

    pub fn core(&self) -> &RealtimeCore {
        &self.core
    }

    pub fn join_live_class(&self, room: &str, name: &str) -> Result<()> {
        self.core.join_live_class(room, &self.conn, name)
    }

    pub fn leave_live_class(&self, room: &str, name: &str) -> Result<()> {
        self.core.leave_live_class(room, &self.conn, name)
    }

    pub fn set_sharing(&self, room: &str, sharing: bool) -> Result<()> {
        self.core.set_sharing(room, &self.conn, sharing)
    }

    /// Relay to every other member of `room`.
    pub fn relay_to_room(&self, room: &str, event: &ServerEvent) -> Result<usize> {
        self.core.relay_to_others(room, &self.conn, event)
    }

    /// Relay to one connection; silently dropped if it is gone.
    pub fn relay_to_connection(&self, target: &ConnectionId, event: &ServerEvent) -> Result<bool> {
        self.core.relay_direct(target, event)
    }

    pub async fn publish_all(&self, out: Outgoing) -> Result<usize> {
        self.core.publish_all(out).await
    }
}
