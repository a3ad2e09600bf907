use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use classroom_core::error::{ClassroomError, Result};
use classroom_core::protocol::ClientEvent;

use crate::realtime::RealtimeCtx;

/// A handler for one group of client events.
#[async_trait]
pub trait EventService: Send + Sync {
    /// Routing key, matched against `ClientEvent::svc()`.
    fn svc(&self) -> &'static str;
    async fn handle(&self, ctx: RealtimeCtx, event: ClientEvent) -> Result<()>;
}

/// Registry and dispatcher for event services.
#[derive(Default)]
pub struct Dispatcher {
    services: DashMap<&'static str, Arc<dyn EventService>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
        }
    }

    pub fn register(&self, svc: Arc<dyn EventService>) {
        self.services.insert(svc.svc(), svc);
    }

    pub fn registered_svcs(&self) -> Vec<&'static str> {
        self.services.iter().map(|e| *e.key()).collect()
    }

    pub async fn dispatch(&self, ctx: RealtimeCtx, event: ClientEvent) -> Result<()> {
        let svc = event.svc();
        let handler = self
            .services
            .get(svc)
            .ok_or_else(|| ClassroomError::Internal(format!("no service registered for {svc}")))?
            .value()
            .clone();
        handler.handle(ctx, event).await
    }
}
