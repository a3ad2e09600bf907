//! Presence broadcaster: join/leave a live class and push the attendee list.

use classroom_core::error::Result;
use classroom_core::protocol::ServerEvent;

use crate::realtime::core::{RealtimeCore, RoomTable};
use crate::realtime::types::{ConnectionId, PreparedMsg};

impl RealtimeCore {
    /// Join `room` as `name`, then notify the room.
    ///
    /// If the room's presenter is sharing, the joiner alone also gets
    /// `screen share {sharing: true}`.
    pub fn join_live_class(&self, room: &str, conn: &ConnectionId, name: &str) -> Result<()> {
        let mut table = self.rooms()?;
        let changed = table.join(room, conn, name);
        let reached = self.notify_attendees(&table, room)?;
        tracing::debug!(%room, %conn, %name, changed, reached, "joined live class");

        if table.presenter(room).is_some_and(|p| p.sharing) {
            let prepared = PreparedMsg::prepare(&ServerEvent::ScreenShare { sharing: true })?;
            self.try_deliver(conn, &prepared);
        }
        Ok(())
    }

    /// Leave `room`, removing `name`; rooms never joined emit nothing.
    pub fn leave_live_class(&self, room: &str, conn: &ConnectionId, name: &str) -> Result<()> {
        let mut table = self.rooms()?;
        if !table.leave(room, conn, name) {
            tracing::debug!(%room, %conn, "leave for unknown room ignored");
            return Ok(());
        }
        let reached = self.notify_attendees(&table, room)?;
        tracing::debug!(%room, %conn, %name, reached, "left live class");
        Ok(())
    }

    /// Send the room's full attendee list to its broadcast scope.
    ///
    /// Callers hold the table lock; that is what keeps snapshots in
    /// mutation order.
    pub(crate) fn notify_attendees(&self, table: &RoomTable, room: &str) -> Result<usize> {
        let prepared = PreparedMsg::prepare(&ServerEvent::Attendees(table.attendees(room)))?;
        let members = table.members(room);
        Ok(self.fanout_lossy(&members, &prepared))
    }
}
