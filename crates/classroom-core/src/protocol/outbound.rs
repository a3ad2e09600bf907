//! Server -> client events.

use serde::Serialize;
use serde_json::Value;

use super::names;
use crate::error::{ClassroomError, Result};

/// Outbound event, serialized as `{"event": <name>, "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// First frame of every session: the connection's own id.
    #[serde(rename = "connected")]
    Connected {
        #[serde(rename = "socketId")]
        socket_id: String,
    },
    #[serde(rename = "chat message")]
    ChatMessage(Value),
    /// Full attendee list of a room. Order carries no meaning.
    #[serde(rename = "live class attendees")]
    Attendees(Vec<String>),
    #[serde(rename = "screen share")]
    ScreenShare { sharing: bool },
    #[serde(rename = "student wants stream")]
    StudentWantsStream {
        #[serde(rename = "studentSocketId")]
        student_socket_id: String,
    },
    #[serde(rename = "teacher signal")]
    TeacherSignal { signal: Value },
    #[serde(rename = "student signal")]
    StudentSignal {
        signal: Value,
        #[serde(rename = "studentSocketId")]
        student_socket_id: String,
    },
    /// Rejection of the sender's last frame.
    #[serde(rename = "error")]
    Error { code: &'static str, msg: String },
}

impl ServerEvent {
    /// Build an error event from any core error.
    pub fn error(err: &ClassroomError) -> Self {
        ServerEvent::Error {
            code: err.client_code().as_str(),
            msg: err.to_string(),
        }
    }

    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connected { .. } => names::CONNECTED,
            ServerEvent::ChatMessage(_) => names::CHAT_MESSAGE,
            ServerEvent::Attendees(_) => names::LIVE_CLASS_ATTENDEES,
            ServerEvent::ScreenShare { .. } => names::SCREEN_SHARE,
            ServerEvent::StudentWantsStream { .. } => names::STUDENT_WANTS_STREAM,
            ServerEvent::TeacherSignal { .. } => names::TEACHER_SIGNAL,
            ServerEvent::StudentSignal { .. } => names::STUDENT_SIGNAL,
            ServerEvent::Error { .. } => names::ERROR,
        }
    }

    /// Serialize to the JSON text sent on the wire.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ClassroomError::Internal(format!("json encode failed: {e}")))
    }
}
