//! Built-in event services.
//!
//! - `chat`: un-scoped chat broadcast
//! - `live_class`: attendance (join/leave + attendee list)
//! - `signaling`: screen-share flag and WebRTC signaling relay

pub mod chat;
pub mod live_class;
pub mod signaling;

pub use chat::ChatService;
pub use live_class::LiveClassService;
pub use signaling::SignalingService;
