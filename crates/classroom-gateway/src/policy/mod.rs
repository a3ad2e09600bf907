//! Policy layer (event allowlist, frame limits, rate limiting).
//!
//! Compiles the `policy` config section into a runtime shared by every
//! session; per-connection state (the token bucket) is created per session.

pub mod allowlist;
pub mod engine;

pub use engine::{ConnRateLimiter, PolicyDecision, PolicyRuntime};
