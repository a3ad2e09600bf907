//! Axum router wiring (HTTP -> WS upgrade + ops endpoints).

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops, transport};

/// Path of the WebSocket endpoint.
pub const SOCKET_PATH: &str = "/socket";

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(SOCKET_PATH, get(transport::ws::ws_upgrade))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
