use async_trait::async_trait;

use classroom_core::error::{ClassroomError, Result};
use classroom_core::protocol::ClientEvent;

use crate::dispatch::EventService;
use crate::realtime::RealtimeCtx;

/// Attendance: `join live class` / `leave live class`.
///
/// Room ids are not checked against any course data; any string is a room.
#[derive(Default)]
pub struct LiveClassService;

impl LiveClassService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventService for LiveClassService {
    fn svc(&self) -> &'static str {
        "live_class"
    }

    async fn handle(&self, ctx: RealtimeCtx, event: ClientEvent) -> Result<()> {
        match event {
            ClientEvent::JoinLiveClass(req) => ctx.join_live_class(&req.live_class_id, &req.user),
            ClientEvent::LeaveLiveClass(req) => ctx.leave_live_class(&req.live_class_id, &req.user),
            other => Err(ClassroomError::Internal(format!(
                "live_class service got {}",
                other.name()
            ))),
        }
    }
}
