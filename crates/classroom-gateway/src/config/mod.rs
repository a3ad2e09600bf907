//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use classroom_core::error::{ClassroomError, Result};

pub use schema::{ChatSection, GatewayConfig, GatewaySection, PolicySection};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CLASSROOM_CONFIG";
/// Config file used when `CLASSROOM_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "classroom.yaml";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ClassroomError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| ClassroomError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the config path from the environment and load it.
pub fn load_from_env() -> Result<GatewayConfig> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_from_file(&path)
}
