//! Shared application state for the live-class gateway.
//!
//! Owns the single `RealtimeCore`, the dispatcher with its built-in
//! services, the compiled policy and the shutdown signal. Startup errors are
//! returned, never panicked.

use std::sync::Arc;

use tokio::sync::watch;

use classroom_core::error::{ClassroomError, Result};
use classroom_core::protocol::{inbound::svc_of, names};

use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;
use crate::obs::GatewayMetrics;
use crate::policy::PolicyRuntime;
use crate::realtime::RealtimeCore;
use crate::services::{ChatService, LiveClassService, SignalingService};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    realtime: Arc<RealtimeCore>,
    dispatcher: Arc<Dispatcher>,
    metrics: Arc<GatewayMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    policy: PolicyRuntime,
    shutdown: watch::Sender<bool>,
}

impl AppState {
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let policy = PolicyRuntime::new(&cfg.policy)
            .map_err(|e| ClassroomError::BadRequest(format!("policy compile failed: {e}")))?;

        let metrics = Arc::new(GatewayMetrics::default());
        let realtime = Arc::new(RealtimeCore::new(Arc::clone(&metrics)));

        let dispatcher = Dispatcher::new();
        dispatcher.register(Arc::new(ChatService::new(cfg.chat.timeout_ms)));
        dispatcher.register(Arc::new(LiveClassService::new()));
        dispatcher.register(Arc::new(SignalingService::new()));

        // every inbound event must have a handler
        let registered = dispatcher.registered_svcs();
        for event in names::INBOUND {
            let routed = svc_of(event).is_some_and(|svc| registered.contains(&svc));
            if !routed {
                return Err(ClassroomError::Internal(format!(
                    "no service handles event: {event}"
                )));
            }
        }

        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                policy,
                shutdown,
            }),
            realtime,
            dispatcher: Arc::new(dispatcher),
            metrics,
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn policy(&self) -> &PolicyRuntime {
        &self.inner.policy
    }

    pub fn realtime(&self) -> Arc<RealtimeCore> {
        Arc::clone(&self.realtime)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Flip readiness off and ask every open session to close.
    pub fn begin_drain(&self) {
        self.metrics.set_draining();
        self.inner.shutdown.send_replace(true);
    }

    /// Receiver that flips to `true` when draining starts.
    pub fn shutdown_rx(&self) -> watch::Receiver<bool> {
        self.inner.shutdown.subscribe()
    }

    /// Point-in-time gauges appended to `/metrics`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("classroom_connections", self.realtime.connections.len() as u64),
            ("classroom_rooms", self.realtime.room_count() as u64),
        ]
    }
}
