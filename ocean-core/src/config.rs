use std::env;
use std::time::Duration;

use crate::error::{OceanError, Result};

/// Chunk size used by the OCEAN upload endpoint: 20 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 20 * 1024 * 1024;
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

pub const UPLOAD_CHUNK_PATH: &str = "/ocean/upload_chunk";
pub const PING_PATH: &str = "/ocean/ping";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub chunk_size: u64,
    pub ping_interval: Duration,
    /// Extra attempts per chunk after the first failure. Zero keeps the
    /// upload strictly single-shot.
    pub chunk_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            ping_interval: DEFAULT_PING_INTERVAL,
            chunk_retries: 0,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(url) = lookup("OCEAN_BASE_URL") {
            cfg.base_url = url;
        }
        if let Some(raw) = lookup("OCEAN_CHUNK_SIZE") {
            cfg.chunk_size = raw
                .trim()
                .parse()
                .map_err(|err| OceanError::Config(format!("invalid OCEAN_CHUNK_SIZE: {err}")))?;
        }
        if let Some(raw) = lookup("OCEAN_PING_INTERVAL_MS") {
            let ms: u64 = raw.trim().parse().map_err(|err| {
                OceanError::Config(format!("invalid OCEAN_PING_INTERVAL_MS: {err}"))
            })?;
            cfg.ping_interval = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup("OCEAN_CHUNK_RETRIES") {
            cfg.chunk_retries = raw
                .trim()
                .parse()
                .map_err(|err| OceanError::Config(format!("invalid OCEAN_CHUNK_RETRIES: {err}")))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(OceanError::Config("chunk size must be non-zero".into()));
        }
        if self.ping_interval.is_zero() {
            return Err(OceanError::Config("ping interval must be non-zero".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(OceanError::Config("base URL must not be empty".into()));
        }
        Ok(())
    }
}
