//! Room membership table.
//!
//! Per live-class room this keeps:
//! - the broadcast scope (connection ids),
//! - the attendee list (display names, set semantics),
//! - which names each connection joined with,
//! - the presenter record.
//!
//! The table is plain data. `RealtimeCore` owns it behind a mutex and emits
//! inside the same critical section as each mutation.

use std::collections::{HashMap, HashSet};

use crate::realtime::types::ConnectionId;

/// Connection currently marked as the room's screen-share source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presenter {
    pub connection: ConnectionId,
    pub sharing: bool,
}

/// One room touched by a disconnect sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweptRoom {
    pub room: String,
    /// The connection was in the broadcast scope (attendees must be re-sent).
    pub was_member: bool,
    /// Presenter record cleared by the sweep.
    pub lost_presenter: Option<Presenter>,
}

#[derive(Debug, Default)]
struct Room {
    members: HashSet<ConnectionId>,
    /// Insertion-ordered, no duplicates.
    attendees: Vec<String>,
    claims: HashMap<ConnectionId, HashSet<String>>,
    presenter: Option<Presenter>,
}

impl Room {
    fn add_attendee(&mut self, name: &str) -> bool {
        if self.attendees.iter().any(|n| n == name) {
            return false;
        }
        self.attendees.push(name.to_string());
        true
    }

    fn remove_attendee(&mut self, name: &str) -> bool {
        let before = self.attendees.len();
        self.attendees.retain(|n| n != name);
        self.attendees.len() != before
    }

    fn claimed_by_other(&self, name: &str, conn: &ConnectionId) -> bool {
        self.claims
            .iter()
            .any(|(c, names)| c != conn && names.contains(name))
    }

    /// Drop every name `conn` joined with that no other member still claims.
    fn release_claims(&mut self, conn: &ConnectionId) {
        let names = self.claims.remove(conn).unwrap_or_default();
        for name in names {
            if !self.claimed_by_other(&name, conn) {
                self.remove_attendee(&name);
            }
        }
    }
}

/// Room table: `room -> Room`, `connection -> rooms`.
#[derive(Debug, Default)]
pub struct RoomTable {
    rooms: HashMap<String, Room>,
    connection_rooms: HashMap<ConnectionId, HashSet<String>>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `conn` to the room's broadcast scope and `name` to its attendees.
    /// Returns whether the attendee list changed.
    pub fn join(&mut self, room: &str, conn: &ConnectionId, name: &str) -> bool {
        let r = self.rooms.entry(room.to_string()).or_default();
        r.members.insert(conn.clone());
        r.claims
            .entry(conn.clone())
            .or_default()
            .insert(name.to_string());
        let changed = r.add_attendee(name);

        self.connection_rooms
            .entry(conn.clone())
            .or_default()
            .insert(room.to_string());
        changed
    }

    /// Remove `conn` from the broadcast scope and `name` from the attendees.
    ///
    /// The name is removed regardless of which connection added it. Other
    /// names `conn` joined with go too, unless another member claims them.
    /// Returns `false` for a room that was never created (nothing to notify).
    pub fn leave(&mut self, room: &str, conn: &ConnectionId, name: &str) -> bool {
        let Some(r) = self.rooms.get_mut(room) else {
            return false;
        };
        r.members.remove(conn);
        r.remove_attendee(name);
        r.release_claims(conn);

        if let Some(set) = self.connection_rooms.get_mut(conn) {
            set.remove(room);
            if set.is_empty() {
                self.connection_rooms.remove(conn);
            }
        }
        true
    }

    /// Sweep `conn` out of every room it is a member of or presents in.
    ///
    /// A name the connection joined with is removed unless another member
    /// of the same room still claims it.
    pub fn remove_connection(&mut self, conn: &ConnectionId) -> Vec<SweptRoom> {
        let member_of = self.connection_rooms.remove(conn).unwrap_or_default();
        let mut swept = Vec::new();

        for (key, r) in self.rooms.iter_mut() {
            let was_member = member_of.contains(key);
            let presenting = r
                .presenter
                .as_ref()
                .is_some_and(|p| &p.connection == conn);
            if !was_member && !presenting {
                continue;
            }

            if was_member {
                r.members.remove(conn);
                r.release_claims(conn);
            }

            let lost_presenter = if presenting { r.presenter.take() } else { None };

            swept.push(SweptRoom {
                room: key.clone(),
                was_member,
                lost_presenter,
            });
        }

        swept.sort_by(|a, b| a.room.cmp(&b.room));
        swept
    }

    /// Record `conn` as the room's presenter. Last writer wins.
    pub fn set_presenter(
        &mut self,
        room: &str,
        conn: &ConnectionId,
        sharing: bool,
    ) -> Option<Presenter> {
        let r = self.rooms.entry(room.to_string()).or_default();
        r.presenter.replace(Presenter {
            connection: conn.clone(),
            sharing,
        })
    }

    pub fn presenter(&self, room: &str) -> Option<&Presenter> {
        self.rooms.get(room).and_then(|r| r.presenter.as_ref())
    }

    /// Current attendee names (empty for unknown rooms).
    pub fn attendees(&self, room: &str) -> Vec<String> {
        self.rooms
            .get(room)
            .map(|r| r.attendees.clone())
            .unwrap_or_default()
    }

    /// Connections in the room's broadcast scope.
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|r| r.members.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub fn is_member(&self, room: &str, conn: &ConnectionId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|r| r.members.contains(conn))
    }

    #[cfg(test)]
    pub fn rooms_of(&self, conn: &ConnectionId) -> Vec<String> {
        let mut rooms: Vec<String> = self
            .connection_rooms
            .get(conn)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ConnectionId {
        ConnectionId::from(s)
    }

    #[test]
    fn join_is_idempotent_per_name() {
        let mut t = RoomTable::new();
        assert!(t.join("lc1", &id("A"), "Alice"));
        assert!(!t.join("lc1", &id("A"), "Alice"));
        assert!(!t.join("lc1", &id("B"), "Alice"));
        assert_eq!(t.attendees("lc1"), vec!["Alice".to_string()]);
        assert_eq!(t.members("lc1").len(), 2);
    }

    #[test]
    fn joins_minus_leaves() {
        let mut t = RoomTable::new();
        t.join("lc1", &id("A"), "Alice");
        t.join("lc1", &id("B"), "Bob");
        t.join("lc1", &id("C"), "Carol");
        assert!(t.leave("lc1", &id("B"), "Bob"));
        assert_eq!(t.attendees("lc1"), vec!["Alice".to_string(), "Carol".to_string()]);
        assert!(!t.is_member("lc1", &id("B")));
        assert!(t.rooms_of(&id("B")).is_empty());
    }

    #[test]
    fn leave_removes_by_name_not_by_connection() {
        let mut t = RoomTable::new();
        t.join("lc1", &id("A"), "Alice");
        t.leave("lc1", &id("B"), "Alice");
        assert!(t.attendees("lc1").is_empty());
        assert!(t.is_member("lc1", &id("A")));
    }

    #[test]
    fn leave_releases_other_names_of_the_leaver() {
        let mut t = RoomTable::new();
        t.join("lc1", &id("A"), "Alice");
        t.join("lc1", &id("A"), "Ally");
        t.leave("lc1", &id("A"), "Alice");
        assert!(t.attendees("lc1").is_empty());

        t.remove_connection(&id("A"));
        assert!(t.attendees("lc1").is_empty());
    }

    #[test]
    fn leave_under_foreign_name_still_drops_own_name() {
        let mut t = RoomTable::new();
        t.join("lc1", &id("A"), "Alice");
        t.join("lc1", &id("B"), "Bob");
        t.leave("lc1", &id("B"), "Alice");
        assert!(t.attendees("lc1").is_empty());

        t.remove_connection(&id("B"));
        assert!(t.attendees("lc1").is_empty());
        assert!(t.is_member("lc1", &id("A")));
    }

    #[test]
    fn leave_keeps_names_claimed_by_another_member() {
        let mut t = RoomTable::new();
        t.join("lc1", &id("A"), "Sam");
        t.join("lc1", &id("B"), "Sam");
        t.join("lc1", &id("B"), "Bob");
        t.leave("lc1", &id("B"), "Bob");
        assert_eq!(t.attendees("lc1"), vec!["Sam".to_string()]);
    }

    #[test]
    fn leave_unknown_room_is_noop() {
        let mut t = RoomTable::new();
        assert!(!t.leave("nowhere", &id("A"), "Alice"));
        assert_eq!(t.room_count(), 0);
    }

    #[test]
    fn disconnect_removes_claimed_names_in_every_room() {
        let mut t = RoomTable::new();
        t.join("lc1", &id("A"), "Alice");
        t.join("lc1", &id("B"), "Bob");
        t.join("lc2", &id("B"), "Bob");

        let swept = t.remove_connection(&id("B"));
        let rooms: Vec<_> = swept.iter().map(|s| s.room.as_str()).collect();
        assert_eq!(rooms, vec!["lc1", "lc2"]);
        assert!(swept.iter().all(|s| s.was_member && s.lost_presenter.is_none()));

        assert_eq!(t.attendees("lc1"), vec!["Alice".to_string()]);
        assert!(t.attendees("lc2").is_empty());
        assert_eq!(t.room_count(), 2);
    }

    #[test]
    fn disconnect_keeps_name_still_claimed_by_another_connection() {
        let mut t = RoomTable::new();
        t.join("lc1", &id("A"), "Bob");
        t.join("lc1", &id("B"), "Bob");
        t.remove_connection(&id("B"));
        assert_eq!(t.attendees("lc1"), vec!["Bob".to_string()]);
        t.remove_connection(&id("A"));
        assert!(t.attendees("lc1").is_empty());
    }

    #[test]
    fn second_sweep_is_noop() {
        let mut t = RoomTable::new();
        t.join("lc1", &id("A"), "Alice");
        assert_eq!(t.remove_connection(&id("A")).len(), 1);
        assert!(t.remove_connection(&id("A")).is_empty());
    }

    #[test]
    fn presenter_last_writer_wins_and_is_cleared_on_disconnect() {
        let mut t = RoomTable::new();
        t.set_presenter("lc1", &id("A"), true);
        let prev = t.set_presenter("lc1", &id("B"), true);
        assert_eq!(prev.map(|p| p.connection), Some(id("A")));

        // A is no longer presenter: its sweep must not touch lc1.
        assert!(t.remove_connection(&id("A")).is_empty());

        let swept = t.remove_connection(&id("B"));
        assert_eq!(swept.len(), 1);
        assert!(!swept[0].was_member);
        assert_eq!(swept[0].lost_presenter.as_ref().map(|p| p.sharing), Some(true));
        assert!(t.presenter("lc1").is_none());
    }
}
