//! Sandbox thread configuration.

use serde::{Deserialize, Serialize};

use crate::core::AppResult;

/// Environment variable holding the `events` limit.
pub const ENV_EVENTS_LIMIT: &str = "SANDBOX_EVENTS_LIMIT";
/// Environment variable holding the worker stack size in bytes.
pub const ENV_THREAD_STACK_SIZE: &str = "SANDBOX_THREAD_STACK_SIZE";

/// Smallest stack size accepted for accounted threads.
pub const MIN_THREAD_STACK_SIZE: usize = 16 * 1024;

/// Configuration for accounted threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Maximum concurrently running accounted threads.
    pub events_limit: u32,
    /// Stack size for accounted threads; platform default when unset.
    #[serde(default)]
    pub thread_stack_size: Option<usize>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            events_limit: 10,
            thread_stack_size: None,
        }
    }
}

impl SandboxConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `events` limit.
    #[must_use]
    pub const fn with_events_limit(mut self, limit: u32) -> Self {
        self.events_limit = limit;
        self
    }

    /// Set the stack size of accounted threads.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = Some(bytes);
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.events_limit == 0 {
            return Err("events_limit must be greater than 0".into());
        }
        if let Some(stack) = self.thread_stack_size {
            if stack < MIN_THREAD_STACK_SIZE {
                return Err(format!(
                    "thread_stack_size must be at least {MIN_THREAD_STACK_SIZE} bytes"
                ));
            }
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the environment, reading `.env` first if present.
    ///
    /// Unset variables keep their default values.
    ///
    /// # Errors
    ///
    /// Fails if a variable is set but not a valid number, or validation fails.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();

        if let Ok(raw) = std::env::var(ENV_EVENTS_LIMIT) {
            cfg.events_limit = raw
                .trim()
                .parse::<u32>()
                .map_err(|e| anyhow::anyhow!("{ENV_EVENTS_LIMIT}={raw:?}: {e}"))?;
        }
        if let Ok(raw) = std::env::var(ENV_THREAD_STACK_SIZE) {
            let bytes = raw
                .trim()
                .parse::<usize>()
                .map_err(|e| anyhow::anyhow!("{ENV_THREAD_STACK_SIZE}={raw:?}: {e}"))?;
            cfg.thread_stack_size = Some(bytes);
        }

        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}
