use serde::Deserialize;
use classroom_core::error::{ClassroomError, Result};
use classroom_core::protocol::names;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub policy: PolicySection,

    #[serde(default)]
    pub chat: ChatSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ClassroomError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.policy.validate()?;

        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            policy: PolicySection::default(),
            chat: ChatSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Per-connection outbound queue capacity (frames).
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            outbound_queue: default_outbound_queue(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(ClassroomError::BadRequest(format!(
                "gateway.listen must be a valid socket address: {}",
                self.listen
            )));
        }
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(ClassroomError::BadRequest(
                "gateway.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(ClassroomError::BadRequest(
                "gateway.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(ClassroomError::BadRequest(
                "gateway.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if !(16..=65536).contains(&self.outbound_queue) {
            return Err(ClassroomError::BadRequest(
                "gateway.outbound_queue must be between 16 and 65536".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:5000".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_outbound_queue() -> usize {
    1024
}

/// Per-connection inbound policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicySection {
    /// Signaling frames carry SDP blobs, so this is larger than a chat-only limit.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    #[serde(default = "default_rate_limit_rps")]
    pub rate_limit_rps: u32,

    #[serde(default = "default_rate_limit_burst")]
    pub rate_limit_burst: u32,

    /// Event names a client may send, or `"*"`.
    #[serde(default = "default_allowed_events")]
    pub allowed_events: Vec<String>,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            max_frame_bytes: default_max_frame_bytes(),
            rate_limit_rps: default_rate_limit_rps(),
            rate_limit_burst: default_rate_limit_burst(),
            allowed_events: default_allowed_events(),
        }
    }
}

impl PolicySection {
    pub fn validate(&self) -> Result<()> {
        if !(256..=1_048_576).contains(&self.max_frame_bytes) {
            return Err(ClassroomError::BadRequest(
                "policy.max_frame_bytes must be between 256 and 1048576".into(),
            ));
        }
        if self.rate_limit_rps == 0 || self.rate_limit_burst == 0 {
            return Err(ClassroomError::BadRequest(
                "policy.rate_limit_rps and policy.rate_limit_burst must be at least 1".into(),
            ));
        }
        if self.allowed_events.is_empty() {
            return Err(ClassroomError::BadRequest(
                "policy.allowed_events must not be empty".into(),
            ));
        }
        for ev in &self.allowed_events {
            if ev != "*" && !names::INBOUND.contains(&ev.as_str()) {
                return Err(ClassroomError::BadRequest(format!(
                    "policy.allowed_events has unknown event: {ev}"
                )));
            }
        }
        Ok(())
    }
}

fn default_max_frame_bytes() -> usize {
    65536
}
fn default_rate_limit_rps() -> u32 {
    50
}
fn default_rate_limit_burst() -> u32 {
    100
}
fn default_allowed_events() -> Vec<String> {
    vec!["*".into()]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatSection {
    /// Per-recipient delivery timeout; 0 waits for queue space indefinitely.
    #[serde(default = "default_chat_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            timeout_ms: default_chat_timeout_ms(),
        }
    }
}

fn default_chat_timeout_ms() -> u64 {
    1500
}
