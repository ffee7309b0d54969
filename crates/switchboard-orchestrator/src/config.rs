use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use switchboard_core::{SwitchboardError, SwitchboardResult};

/// Configures retry behaviour for failed execution attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of execution attempts per request, first try included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay in milliseconds before the second attempt.
    #[serde(default = "default_backoff_min_ms")]
    pub backoff_min_ms: u64,
    /// Cap in milliseconds for the exponential backoff.
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_min_ms() -> u64 {
    4_000
}

fn default_backoff_max_ms() -> u64 {
    10_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_min_ms: default_backoff_min_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after the given attempt (1-based): the minimum delay
    /// doubled per attempt, capped at the maximum.
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1);
        self.backoff_min_ms
            .saturating_mul(2u64.saturating_pow(exponent))
            .min(self.backoff_max_ms)
    }
}

/// Dispatcher tunables. All fields have built-in defaults so the system is
/// usable with zero configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Seconds between background health-check sweeps.
    #[serde(default = "default_health_interval_secs")]
    pub health_check_interval_secs: u64,
    /// Timeout applied to requests that do not carry their own.
    #[serde(default = "default_request_timeout_secs")]
    pub default_timeout_secs: u64,
    /// Retry behaviour for execution attempts.
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_health_interval_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            health_check_interval_secs: default_health_interval_secs(),
            default_timeout_secs: default_request_timeout_secs(),
            retry: RetryPolicy::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Builds a config from environment variables, falling back to defaults
    /// for anything unset.
    ///
    /// Recognized variables:
    /// `SWITCHBOARD_HEALTH_INTERVAL_SECS`,
    /// `SWITCHBOARD_DEFAULT_TIMEOUT_SECS`,
    /// `SWITCHBOARD_RETRY_MAX_ATTEMPTS`,
    /// `SWITCHBOARD_RETRY_BACKOFF_MIN_MS`,
    /// `SWITCHBOARD_RETRY_BACKOFF_MAX_MS`.
    pub fn from_env() -> SwitchboardResult<Self> {
        let mut config = Self::default();
        if let Some(v) = env_parse("SWITCHBOARD_HEALTH_INTERVAL_SECS")? {
            config.health_check_interval_secs = v;
        }
        if let Some(v) = env_parse("SWITCHBOARD_DEFAULT_TIMEOUT_SECS")? {
            config.default_timeout_secs = v;
        }
        if let Some(v) = env_parse("SWITCHBOARD_RETRY_MAX_ATTEMPTS")? {
            config.retry.max_attempts = v;
        }
        if let Some(v) = env_parse("SWITCHBOARD_RETRY_BACKOFF_MIN_MS")? {
            config.retry.backoff_min_ms = v;
        }
        if let Some(v) = env_parse("SWITCHBOARD_RETRY_BACKOFF_MAX_MS")? {
            config.retry.backoff_max_ms = v;
        }
        Ok(config)
    }

    /// Loads a config from a TOML file; omitted fields keep their defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> SwitchboardResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&raw).map_err(|e| {
            SwitchboardError::Config(format!(
                "Invalid config file '{}': {e}",
                path.as_ref().display()
            ))
        })
    }
}

fn env_parse<T: FromStr>(name: &str) -> SwitchboardResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| SwitchboardError::Config(format!("Invalid {name}='{raw}': {e}"))),
        Err(_) => Ok(None),
    }
}
