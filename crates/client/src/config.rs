//! Client configuration (timings), read from the environment with defaults.

use std::time::Duration;

use anyhow::{Context, bail};
use golden_auth::WatchdogConfig;

pub const SESSION_CHECK_SECS_VAR: &str = "GOLDEN_SESSION_CHECK_SECS";
pub const HIGHLIGHT_MS_VAR: &str = "GOLDEN_HIGHLIGHT_MS";
pub const SUCCESS_MS_VAR: &str = "GOLDEN_SUCCESS_MS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Background token check interval while a protected view is mounted.
    pub session_check_interval: Duration,
    /// How long a just-changed row stays highlighted.
    pub highlight_duration: Duration,
    /// How long a success banner stays visible.
    pub success_duration: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            session_check_interval: Duration::from_secs(60),
            highlight_duration: Duration::from_secs(2),
            success_duration: Duration::from_secs(3),
        }
    }
}

impl ClientConfig {
    pub fn with_session_check_interval(mut self, interval: Duration) -> Self {
        self.session_check_interval = interval;
        self
    }

    pub fn with_highlight_duration(mut self, duration: Duration) -> Self {
        self.highlight_duration = duration;
        self
    }

    pub fn with_success_duration(mut self, duration: Duration) -> Self {
        self.success_duration = duration;
        self
    }

    /// Watchdog settings for [`golden_auth::SessionGuard::with_watchdog_config`].
    pub fn watchdog_config(&self) -> WatchdogConfig {
        WatchdogConfig::default().with_interval(self.session_check_interval)
    }

    /// Read overrides from `GOLDEN_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(SESSION_CHECK_SECS_VAR) {
            config.session_check_interval =
                Duration::from_secs(parse_positive(SESSION_CHECK_SECS_VAR, &raw)?);
        }
        if let Some(raw) = lookup(HIGHLIGHT_MS_VAR) {
            config.highlight_duration =
                Duration::from_millis(parse_positive(HIGHLIGHT_MS_VAR, &raw)?);
        }
        if let Some(raw) = lookup(SUCCESS_MS_VAR) {
            config.success_duration = Duration::from_millis(parse_positive(SUCCESS_MS_VAR, &raw)?);
        }
        Ok(config)
    }
}

fn parse_positive(key: &str, raw: &str) -> anyhow::Result<u64> {
    let value: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a whole number, got {raw:?}"))?;
    if value == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(value)
}
