use async_trait::async_trait;

use classroom_core::error::{ClassroomError, Result};
use classroom_core::protocol::{ClientEvent, ServerEvent};

use crate::dispatch::EventService;
use crate::realtime::{Outgoing, QoS, RealtimeCtx};

/// Relays `chat message` to every connected client, sender included.
pub struct ChatService {
    timeout_ms: u64,
}

impl ChatService {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }
}

#[async_trait]
impl EventService for ChatService {
    fn svc(&self) -> &'static str {
        "chat"
    }

    async fn handle(&self, ctx: RealtimeCtx, event: ClientEvent) -> Result<()> {
        match event {
            ClientEvent::ChatMessage(msg) => {
                let out = Outgoing {
                    qos: QoS::Reliable {
                        timeout_ms: self.timeout_ms,
                    },
                    event: ServerEvent::ChatMessage(msg),
                };
                let reached = ctx.publish_all(out).await?;
                tracing::debug!(conn = %ctx.connection_id(), reached, "chat message broadcast");
                Ok(())
            }
            other => Err(ClassroomError::Internal(format!(
                "chat service got {}",
                other.name()
            ))),
        }
    }
}
