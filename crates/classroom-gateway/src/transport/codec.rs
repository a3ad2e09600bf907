//! Decode-once codec for the transport layer.
//!
//! - Text frames => `ClientEvent` (lazy `RawValue` payload parsing)
//! - Binary frames => rejected, the protocol is text only
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use classroom_core::error::{ClassroomError, Result};
use classroom_core::protocol::{decode_event, ClientEvent};

#[derive(Debug)]
pub enum Inbound {
    Event(ClientEvent),
    Ping(Vec<u8>),
    Pong,
    Close,
}

/// Cheap length, computed before any parsing.
pub fn frame_len(msg: &Message) -> usize {
    match msg {
        Message::Text(s) => s.len(),
        Message::Binary(b) => b.len(),
        Message::Ping(v) | Message::Pong(v) => v.len(),
        Message::Close(_) => 0,
    }
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Text(s) => Ok(Inbound::Event(decode_event(&s)?)),
        Message::Binary(_) => Err(ClassroomError::BadRequest(
            "binary frames are not supported".into(),
        )),
        Message::Ping(v) => Ok(Inbound::Ping(v)),
        Message::Pong(_) => Ok(Inbound::Pong),
        Message::Close(_) => Ok(Inbound::Close),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;

    #[test]
    fn text_frame_decodes_to_event() {
        let msg = Message::Text(r#"{"event":"chat message","data":"hi"}"#.to_string());
        assert_eq!(frame_len(&msg), 36);
        match decode(msg).unwrap() {
            Inbound::Event(ev) => assert_eq!(ev.name(), "chat message"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn binary_frame_is_bad_request() {
        let err = decode(Message::Binary(vec![1, 2, 3])).unwrap_err();
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
    }
}
