use std::fmt;
use std::sync::Arc;

use axum::extract::ws::Message;
use uuid::Uuid;

use classroom_core::error::Result;
use classroom_core::protocol::ServerEvent;

/// Opaque per-connection identity, valid for the life of one socket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Arc<str>);

impl ConnectionId {
    /// Fresh random id.
    pub fn generate() -> Self {
        Self(Arc::from(Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for ConnectionId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quality-of-Service strategy for outgoing delivery.
#[derive(Debug, Clone, Copy, Default)]
pub enum QoS {
    /// Never awaits: if the recipient's queue is full, the frame is dropped.
    #[default]
    Lossy,
    /// Awaits queue space per recipient, up to `timeout_ms` (0 = no timeout).
    Reliable { timeout_ms: u64 },
}

/// Application-level outgoing message.
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub qos: QoS,
    pub event: ServerEvent,
}

/// Prepared message cached for broadcasting (serialize once, send N times).
#[derive(Debug, Clone)]
pub struct PreparedMsg {
    event: &'static str,
    text: String,
}

impl PreparedMsg {
    pub fn prepare(event: &ServerEvent) -> Result<Self> {
        Ok(Self {
            event: event.name(),
            text: event.encode()?,
        })
    }

    /// Event name, for metrics labels.
    pub fn event(&self) -> &'static str {
        self.event
    }

    pub fn to_ws_message(&self) -> Message {
        Message::Text(self.text.clone())
    }
}
