//! Realtime runtime (egress engine) for the gateway.
//!
//! Connection registry + room table + QoS-based publish helpers.

pub mod core;
pub mod types;

pub use self::core::{Connection, ConnectionRegistry, RealtimeCore, RealtimeCtx, RoomTable};
pub use self::types::{ConnectionId, Outgoing, PreparedMsg, QoS};
