//! Realtime core components for the gateway runtime.
//!
//! Connection registry, room membership table, and the egress runtime shared
//! across services. Presence broadcasting, signaling relay and the
//! disconnect sweep are `RealtimeCore` operations split into their own files.

mod attendance;
mod connections;
mod realtime;
mod reconciler;
mod relay;
mod rooms;

pub use connections::{Connection, ConnectionRegistry};
pub use realtime::{RealtimeCore, RealtimeCtx};
pub use rooms::{Presenter, RoomTable, SweptRoom};
