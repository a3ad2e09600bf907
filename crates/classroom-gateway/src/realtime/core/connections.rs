use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::realtime::types::ConnectionId;

/// One connection's outbound queue sender.
#[derive(Clone)]
pub struct Connection {
    pub tx: mpsc::Sender<Message>,
}

/// Connection registry: `connection id -> outbound queue`.
///
/// An id stays resolvable until the session has finished its disconnect
/// sweep, so room fan-out never races with a half-removed connection.
#[derive(Default)]
pub struct ConnectionRegistry {
    conns: DashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            conns: DashMap::new(),
        }
    }

    pub fn insert(&self, id: ConnectionId, conn: Connection) {
        self.conns.insert(id, conn);
    }

    pub fn remove(&self, id: &ConnectionId) -> Option<Connection> {
        self.conns.remove(id).map(|(_, conn)| conn)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<Connection> {
        self.conns.get(id).map(|r| r.value().clone())
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.conns.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }

    /// Snapshot of every live connection.
    pub fn all(&self) -> Vec<(ConnectionId, Connection)> {
        self.conns
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }
}
