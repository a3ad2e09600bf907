//! Client -> server events.
//!
//! Decoding happens in two steps: the frame header (`event`) is parsed
//! strictly, then `data` is parsed into the payload type the event name
//! selects. A frame that is not JSON or names an unknown event is a
//! `BadRequest`; a known event with a bad payload is an `InvalidPayload`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;

use super::names;
use crate::error::{ClassroomError, Result};

/// Wire frame (Text frame).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Frame {
    /// Event name, e.g. `"join live class"`.
    pub event: String,
    /// Optional payload, stored as raw JSON (lazy parsing).
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

/// `join live class` / `leave live class` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub live_class_id: String,
    /// Display name shown in the attendee list.
    pub user: String,
}

/// `screen share` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenShare {
    pub live_class_id: String,
    pub sharing: bool,
}

/// `student wants stream` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest {
    pub live_class_id: String,
    /// Viewer asking for the stream. Defaults to the sender when absent.
    #[serde(default)]
    pub student_socket_id: Option<String>,
}

/// `teacher signal` payload: presenter -> one viewer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSignal {
    pub student_socket_id: String,
    #[serde(default)]
    pub signal: Value,
}

/// `student signal` payload: viewer -> rest of the room.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSignal {
    pub live_class_id: String,
    #[serde(default)]
    pub signal: Value,
}

/// Decoded client event.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    ChatMessage(Value),
    JoinLiveClass(Attendance),
    LeaveLiveClass(Attendance),
    ScreenShare(ScreenShare),
    StudentWantsStream(StreamRequest),
    TeacherSignal(TeacherSignal),
    StudentSignal(StudentSignal),
}

impl ClientEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::ChatMessage(_) => names::CHAT_MESSAGE,
            ClientEvent::JoinLiveClass(_) => names::JOIN_LIVE_CLASS,
            ClientEvent::LeaveLiveClass(_) => names::LEAVE_LIVE_CLASS,
            ClientEvent::ScreenShare(_) => names::SCREEN_SHARE,
            ClientEvent::StudentWantsStream(_) => names::STUDENT_WANTS_STREAM,
            ClientEvent::TeacherSignal(_) => names::TEACHER_SIGNAL,
            ClientEvent::StudentSignal(_) => names::STUDENT_SIGNAL,
        }
    }

    /// Service that owns this event (dispatcher routing key).
    pub fn svc(&self) -> &'static str {
        svc_of(self.name()).unwrap_or("unknown")
    }
}

/// Service owning an inbound event name.
pub fn svc_of(event: &str) -> Option<&'static str> {
    match event {
        names::CHAT_MESSAGE => Some("chat"),
        names::JOIN_LIVE_CLASS | names::LEAVE_LIVE_CLASS => Some("live_class"),
        names::SCREEN_SHARE
        | names::STUDENT_WANTS_STREAM
        | names::TEACHER_SIGNAL
        | names::STUDENT_SIGNAL => Some("signaling"),
        _ => None,
    }
}

/// Decode a text frame into a typed event.
pub fn decode_event(text: &str) -> Result<ClientEvent> {
    let frame: Frame = serde_json::from_str(text)
        .map_err(|e| ClassroomError::BadRequest(format!("invalid frame json: {e}")))?;
    frame.into_event()
}

impl Frame {
    /// Parse `data` according to `event`.
    pub fn into_event(self) -> Result<ClientEvent> {
        let event = self.event.as_str();
        let data = self.data.as_deref();

        let decoded = match event {
            // Any shape, null and absent included.
            names::CHAT_MESSAGE => match data {
                Some(raw) => ClientEvent::ChatMessage(parse_data(event, Some(raw))?),
                None => ClientEvent::ChatMessage(Value::Null),
            },
            names::JOIN_LIVE_CLASS => {
                let p: Attendance = parse_data(event, data)?;
                require(event, "liveClassId", &p.live_class_id)?;
                require(event, "user", &p.user)?;
                ClientEvent::JoinLiveClass(p)
            }
            names::LEAVE_LIVE_CLASS => {
                let p: Attendance = parse_data(event, data)?;
                require(event, "liveClassId", &p.live_class_id)?;
                require(event, "user", &p.user)?;
                ClientEvent::LeaveLiveClass(p)
            }
            names::SCREEN_SHARE => {
                let p: ScreenShare = parse_data(event, data)?;
                require(event, "liveClassId", &p.live_class_id)?;
                ClientEvent::ScreenShare(p)
            }
            names::STUDENT_WANTS_STREAM => {
                let p: StreamRequest = parse_data(event, data)?;
                require(event, "liveClassId", &p.live_class_id)?;
                if let Some(id) = &p.student_socket_id {
                    require(event, "studentSocketId", id)?;
                }
                ClientEvent::StudentWantsStream(p)
            }
            names::TEACHER_SIGNAL => {
                let p: TeacherSignal = parse_data(event, data)?;
                require(event, "studentSocketId", &p.student_socket_id)?;
                ClientEvent::TeacherSignal(p)
            }
            names::STUDENT_SIGNAL => {
                let p: StudentSignal = parse_data(event, data)?;
                require(event, "liveClassId", &p.live_class_id)?;
                ClientEvent::StudentSignal(p)
            }
            other => {
                tracing::debug!(event = %other, "unknown event");
                return Err(ClassroomError::BadRequest(format!("unknown event: {other}")));
            }
        };
        Ok(decoded)
    }
}

/// With lazy parsing, payload errors are reported per event.
fn parse_data<T: DeserializeOwned>(event: &str, raw: Option<&RawValue>) -> Result<T> {
    let raw = raw.ok_or_else(|| ClassroomError::InvalidPayload(format!("{event} requires data")))?;
    serde_json::from_str(raw.get())
        .map_err(|e| ClassroomError::InvalidPayload(format!("{event}: {e}")))
}

fn require(event: &str, field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ClassroomError::InvalidPayload(format!(
            "{event}: {field} must not be empty"
        )));
    }
    Ok(())
}
