//! Inbound event vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use classroom_core::protocol::inbound::ClientEvent;
use classroom_core::protocol::decode_event;

mod vector_loader;
use vector_loader::load;

fn room_of(ev: &ClientEvent) -> Option<&str> {
    match ev {
        ClientEvent::JoinLiveClass(p) | ClientEvent::LeaveLiveClass(p) => Some(p.live_class_id.as_str()),
        ClientEvent::ScreenShare(p) => Some(p.live_class_id.as_str()),
        ClientEvent::StudentWantsStream(p) => Some(p.live_class_id.as_str()),
        ClientEvent::StudentSignal(p) => Some(p.live_class_id.as_str()),
        ClientEvent::ChatMessage(_) | ClientEvent::TeacherSignal(_) => None,
    }
}

#[test]
fn event_vectors() {
    let files = [
        "join_ok.json",
        "leave_ok.json",
        "join_missing_user.json",
        "join_missing_data.json",
        "screen_share_ok.json",
        "screen_share_bad_flag.json",
        "wants_stream_no_id.json",
        "teacher_signal_ok.json",
        "chat_any_shape.json",
        "chat_null.json",
        "chat_no_data.json",
        "unknown_event.json",
        "unknown_field.json",
        "not_json.json",
    ];

    for f in files {
        let v = load(f);
        let res = decode_event(&v.wire_text());

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.client_code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let ev = res.expect("expected ok event");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(ev.name(), ex["event"].as_str().unwrap(), "vector={}", v.description);
        assert_eq!(ev.svc(), ex["svc"].as_str().unwrap(), "vector={}", v.description);

        if let Some(room) = ex.get("liveClassId").and_then(|r| r.as_str()) {
            assert_eq!(room_of(&ev), Some(room), "vector={}", v.description);
        }
        if let Some(user) = ex.get("user").and_then(|u| u.as_str()) {
            match &ev {
                ClientEvent::JoinLiveClass(p) | ClientEvent::LeaveLiveClass(p) => {
                    assert_eq!(p.user, user, "vector={}", v.description)
                }
                other => panic!("vector={} decoded to {other:?}", v.description),
            }
        }
    }
}

#[test]
fn wants_stream_without_id_leaves_it_unset() {
    let v = load("wants_stream_no_id.json");
    let ClientEvent::StudentWantsStream(p) = decode_event(&v.wire_text()).unwrap() else {
        panic!("wrong variant");
    };
    assert!(p.student_socket_id.is_none());
}

#[test]
fn teacher_signal_keeps_payload_verbatim() {
    let v = load("teacher_signal_ok.json");
    let ClientEvent::TeacherSignal(p) = decode_event(&v.wire_text()).unwrap() else {
        panic!("wrong variant");
    };
    assert_eq!(p.student_socket_id, "B");
    assert_eq!(p.signal, v.frame["data"]["signal"]);
}

#[test]
fn chat_without_payload_is_null() {
    for f in ["chat_null.json", "chat_no_data.json"] {
        let v = load(f);
        let ev = decode_event(&v.wire_text()).unwrap();
        assert_eq!(ev, ClientEvent::ChatMessage(serde_json::Value::Null), "vector={f}");
    }
}
