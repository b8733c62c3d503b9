use std::path::PathBuf;

use thiserror::Error;

use crate::ai::OpenAiGatewayConfig;
use crate::config_env::{parse_u64_env, parse_usize_env, string_env_or};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_SESSIONS_DIR: &str = "sessions";
const DEFAULT_AUDIO_DIR: &str = "audio_files";
// Whisper rejects uploads above 25 MiB.
const DEFAULT_MAX_AUDIO_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
const DEFAULT_SESSION_PURGE_INTERVAL_SECONDS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub sessions_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub max_audio_upload_bytes: usize,
    /// Zero disables idle eviction; sessions then live for the process lifetime.
    pub session_idle_ttl_seconds: u64,
    pub session_purge_interval_seconds: u64,
    pub gateway: OpenAiGatewayConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let session_purge_interval_seconds = parse_u64_env(
            "SESSION_PURGE_INTERVAL_SECONDS",
            DEFAULT_SESSION_PURGE_INTERVAL_SECONDS,
        )?;
        if session_purge_interval_seconds == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "SESSION_PURGE_INTERVAL_SECONDS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_addr: string_env_or("API_BIND_ADDR", DEFAULT_BIND_ADDR),
            sessions_dir: PathBuf::from(string_env_or("SESSIONS_DIR", DEFAULT_SESSIONS_DIR)),
            audio_dir: PathBuf::from(string_env_or("AUDIO_DIR", DEFAULT_AUDIO_DIR)),
            max_audio_upload_bytes: parse_usize_env(
                "MAX_AUDIO_UPLOAD_BYTES",
                DEFAULT_MAX_AUDIO_UPLOAD_BYTES,
            )?,
            session_idle_ttl_seconds: parse_u64_env("SESSION_IDLE_TTL_SECONDS", 0)?,
            session_purge_interval_seconds,
            gateway: OpenAiGatewayConfig::from_env()?,
        })
    }
}
