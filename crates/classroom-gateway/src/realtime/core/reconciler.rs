//! Disconnect reconciler.
//!
//! Must run while the connection id is still registered: the sweep looks the
//! connection up in the room table, and the notifications it sends go through
//! the registry.

use classroom_core::error::Result;
use classroom_core::protocol::ServerEvent;

use crate::realtime::core::RealtimeCore;
use crate::realtime::types::{ConnectionId, PreparedMsg};

impl RealtimeCore {
    /// Remove `conn` from every room and notify each affected room.
    /// Returns the affected rooms. Calling it twice is harmless.
    pub fn disconnect(&self, conn: &ConnectionId) -> Result<Vec<String>> {
        let stopped = PreparedMsg::prepare(&ServerEvent::ScreenShare { sharing: false })?;
        let mut table = self.rooms()?;
        let swept = table.remove_connection(conn);

        for s in &swept {
            if s.was_member {
                self.notify_attendees(&table, &s.room)?;
            }
            if s.lost_presenter.as_ref().is_some_and(|p| p.sharing) {
                let members = table.members(&s.room);
                self.fanout_lossy(&members, &stopped);
                tracing::info!(room = %s.room, %conn, "presenter disconnected while sharing");
            }
        }

        let rooms: Vec<String> = swept.into_iter().map(|s| s.room).collect();
        if !rooms.is_empty() {
            tracing::debug!(%conn, rooms = ?rooms, "disconnect sweep");
        }
        Ok(rooms)
    }
}
