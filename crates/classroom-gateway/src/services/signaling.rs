use async_trait::async_trait;

use classroom_core::error::{ClassroomError, Result};
use classroom_core::protocol::{ClientEvent, ServerEvent};

use crate::dispatch::EventService;
use crate::realtime::{ConnectionId, RealtimeCtx};

/// Screen-share flag and presenter/viewer signaling.
///
/// Signal payloads are forwarded untouched. The sender of `screen share` is
/// not checked against course ownership.
#[derive(Default)]
pub struct SignalingService;

impl SignalingService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventService for SignalingService {
    fn svc(&self) -> &'static str {
        "signaling"
    }

    async fn handle(&self, ctx: RealtimeCtx, event: ClientEvent) -> Result<()> {
        match event {
            ClientEvent::ScreenShare(req) => ctx.set_sharing(&req.live_class_id, req.sharing),

            ClientEvent::StudentWantsStream(req) => {
                let student_socket_id = req
                    .student_socket_id
                    .unwrap_or_else(|| ctx.connection_id().to_string());
                ctx.relay_to_room(
                    &req.live_class_id,
                    &ServerEvent::StudentWantsStream { student_socket_id },
                )?;
                Ok(())
            }

            ClientEvent::TeacherSignal(req) => {
                let target = ConnectionId::from(req.student_socket_id);
                let event = ServerEvent::TeacherSignal { signal: req.signal };
                ctx.relay_to_connection(&target, &event)?;
                Ok(())
            }

            ClientEvent::StudentSignal(req) => {
                let event = ServerEvent::StudentSignal {
                    signal: req.signal,
                    student_socket_id: ctx.connection_id().to_string(),
                };
                ctx.relay_to_room(&req.live_class_id, &event)?;
                Ok(())
            }

            other => Err(ClassroomError::Internal(format!(
                "signaling service got {}",
                other.name()
            ))),
        }
    }
}
