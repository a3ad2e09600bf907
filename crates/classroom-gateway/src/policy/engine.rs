use std::time::{Duration, Instant};

use classroom_core::error::{ClassroomError, ClientCode, Result};

use crate::config::PolicySection;

use super::allowlist::{compile_event_rules, EventAllowlist};

/// Decision from policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Pass,
    Drop,
    Reject { code: ClientCode, msg: &'static str },
    Close { code: ClientCode, msg: &'static str },
}

/// Gateway-wide policy runtime.
/// Construct once at startup, then share via Arc.
#[derive(Debug)]
pub struct PolicyRuntime {
    max_frame_bytes: usize,
    events: EventAllowlist,
    conn_rps: u32,
    conn_burst: u32,
}

impl PolicyRuntime {
    pub fn new(policy: &PolicySection) -> Result<Self> {
        let events = compile_event_rules(&policy.allowed_events)?;
        if events.is_empty() {
            return Err(ClassroomError::BadRequest("allowed_events empty".into()));
        }

        Ok(Self {
            max_frame_bytes: policy.max_frame_bytes,
            events,
            conn_rps: policy.rate_limit_rps,
            conn_burst: policy.rate_limit_burst,
        })
    }

    pub fn max_frame_bytes(&self) -> usize {
        self.max_frame_bytes
    }

    /// Create the limiter owned by one session.
    pub fn new_connection_limiter(&self) -> ConnRateLimiter {
        ConnRateLimiter::new(self.conn_rps, self.conn_burst)
    }

    /// Cheap check before any decoding.
    pub fn check_len(&self, bytes_len: usize) -> PolicyDecision {
        if bytes_len > self.max_frame_bytes {
            return PolicyDecision::Close {
                code: ClientCode::PayloadTooLarge,
                msg: "frame too large",
            };
        }
        PolicyDecision::Pass
    }

    /// Inbound frame: length, then the connection's rate budget.
    pub fn check_frame(&self, bytes_len: usize, limiter: &mut ConnRateLimiter) -> PolicyDecision {
        match self.check_len(bytes_len) {
            PolicyDecision::Pass => {}
            other => return other,
        }
        if !limiter.allow() {
            return PolicyDecision::Drop;
        }
        PolicyDecision::Pass
    }

    /// Decoded event: allowlist.
    pub fn check_event(&self, event: &str) -> PolicyDecision {
        if !self.events.is_allowed(event) {
            return PolicyDecision::Reject {
                code: ClientCode::NotAllowed,
                msg: "event not allowed",
            };
        }
        PolicyDecision::Pass
    }
}

impl PolicyDecision {
    /// Label used by the policy metric.
    pub fn label(&self) -> &'static str {
        match self {
            PolicyDecision::Pass => "pass",
            PolicyDecision::Drop => "drop",
            PolicyDecision::Reject { .. } => "reject",
            PolicyDecision::Close { .. } => "close",
        }
    }
}

/// Per-connection token bucket (no mutex, owned by the session task).
#[derive(Debug)]
pub struct ConnRateLimiter {
    bucket: TokenBucket,
}

impl ConnRateLimiter {
    pub fn new(rps: u32, burst: u32) -> Self {
        Self {
            bucket: TokenBucket::new(rps, burst),
        }
    }

    pub fn allow(&mut self) -> bool {
        self.bucket.allow()
    }
}

#[derive(Debug)]
struct TokenBucket {
    rps: u32,
    capacity: u32,
    tokens: u32,
    last: Instant,
}

impl TokenBucket {
    fn new(rps: u32, burst: u32) -> Self {
        let rps = rps.max(1);
        let capacity = burst.max(1);
        Self {
            rps,
            capacity,
            tokens: capacity,
            last: Instant::now(),
        }
    }

    fn allow(&mut self) -> bool {
        self.refill();

        if self.tokens == 0 {
            return false;
        }
        self.tokens -= 1;
        true
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        if elapsed < Duration::from_millis(50) {
            return;
        }

        let add = (elapsed.as_millis() as u64 * self.rps as u64 / 1000) as u32;
        if add > 0 {
            self.tokens = self.tokens.saturating_add(add).min(self.capacity);
            self.last = now;
        }
    }
}
