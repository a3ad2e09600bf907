//! Signaling relay: presenter record and opaque offer/answer/candidate forwarding.

use classroom_core::error::Result;
use classroom_core::protocol::ServerEvent;

use crate::realtime::core::RealtimeCore;
use crate::realtime::types::{ConnectionId, PreparedMsg};

impl RealtimeCore {
    /// Mark `conn` as the room's presenter and broadcast the flag to the room.
    /// No ownership check; last writer wins.
    pub fn set_sharing(&self, room: &str, conn: &ConnectionId, sharing: bool) -> Result<()> {
        let prepared = PreparedMsg::prepare(&ServerEvent::ScreenShare { sharing })?;
        let mut table = self.rooms()?;
        if let Some(prev) = table.set_presenter(room, conn, sharing) {
            if &prev.connection != conn {
                tracing::info!(%room, from = %prev.connection, to = %conn, "presenter replaced");
            }
        }
        let members = table.members(room);
        let reached = self.fanout_lossy(&members, &prepared);
        tracing::debug!(%room, %conn, sharing, reached, "screen share updated");
        Ok(())
    }

    /// Forward to every member of `room` except `sender`.
    pub fn relay_to_others(
        &self,
        room: &str,
        sender: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<usize> {
        self.publish_room_lossy(room, event, Some(sender))
    }

    /// Forward to exactly `target`. A target that is gone is dropped without
    /// telling the sender.
    pub fn relay_direct(&self, target: &ConnectionId, event: &ServerEvent) -> Result<bool> {
        if !self.connections.contains(target) {
            self.metrics()
                .signals_undeliverable
                .inc(&[("event", event.name())]);
            tracing::debug!(%target, event = event.name(), "signal target gone, dropped");
            return Ok(false);
        }
        self.send_to_connection(target, event)
    }
}
