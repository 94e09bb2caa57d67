use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RECENT_LIMIT: usize = 5;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub recent_limit: usize,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub schedule_times: Vec<String>, // Format: "HH:MM" (e.g., ["08:00", "14:00"])
}

impl Config {
    pub fn new() -> Result<Self> {
        let api = ApiConfig {
            base_url: std::env::var("DASHBOARD_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: parse_env("DASHBOARD_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            recent_limit: parse_env("DASHBOARD_RECENT_LIMIT", DEFAULT_RECENT_LIMIT)?,
        };

        let config = Config {
            api,
            scheduler: SchedulerConfig {
                enabled: parse_env("SCHEDULER_ENABLED", false)?,
                schedule_times: std::env::var("SCHEDULER_TIMES")
                    .unwrap_or_else(|_| "08:00".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            anyhow::bail!("DASHBOARD_API_URL must not be empty");
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            anyhow::bail!("DASHBOARD_API_URL must start with http:// or https:// (got '{}')", self.api.base_url);
        }
        if self.api.timeout_secs == 0 {
            anyhow::bail!("DASHBOARD_TIMEOUT_SECS must be greater than 0");
        }
        if !(1..=100).contains(&self.api.recent_limit) {
            anyhow::bail!("DASHBOARD_RECENT_LIMIT must be between 1 and 100 (got {})", self.api.recent_limit);
        }
        Ok(())
    }
}

/// Read an environment variable, falling back to `default` when unset
fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}
