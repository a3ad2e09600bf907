//! Event protocol (inbound + outbound).
//!
//! Every WebSocket text frame is `{"event": <name>, "data": <payload>}`:
//! - Inbound: the frame header is parsed once, `data` stays a `RawValue`
//!   until the event name selects its typed payload.
//! - Outbound: `ServerEvent` is serialized once per fan-out and the string
//!   is shared across recipients.
//!
//! Signaling payloads are carried as opaque JSON and never inspected.

pub mod inbound;
pub mod outbound;

pub use inbound::{decode_event, ClientEvent};
pub use outbound::ServerEvent;

/// Event names as they appear on the wire.
pub mod names {
    pub const CONNECTED: &str = "connected";
    pub const CHAT_MESSAGE: &str = "chat message";
    pub const JOIN_LIVE_CLASS: &str = "join live class";
    pub const LEAVE_LIVE_CLASS: &str = "leave live class";
    pub const LIVE_CLASS_ATTENDEES: &str = "live class attendees";
    pub const SCREEN_SHARE: &str = "screen share";
    pub const STUDENT_WANTS_STREAM: &str = "student wants stream";
    pub const TEACHER_SIGNAL: &str = "teacher signal";
    pub const STUDENT_SIGNAL: &str = "student signal";
    pub const ERROR: &str = "error";

    /// Events a client may send.
    pub const INBOUND: [&str; 7] = [
        CHAT_MESSAGE,
        JOIN_LIVE_CLASS,
        LEAVE_LIVE_CLASS,
        SCREEN_SHARE,
        STUDENT_WANTS_STREAM,
        TEACHER_SIGNAL,
        STUDENT_SIGNAL,
    ];
}
