//! Static dispatcher configuration.

use crate::error::{AlertError, Result};
use std::time::Duration;

pub const ENV_ACCOUNT_ID: &str = "ACCOUNT_ID";
pub const ENV_BASE_URL: &str = "BASE_URL";
pub const ENV_WORKERS: &str = "ALERT_WORKERS";
pub const ENV_CALL_TIMEOUT_MS: &str = "ALERT_CALL_TIMEOUT_MS";
pub const ENV_DEVICE_CACHE_SIZE: &str = "ALERT_DEVICE_CACHE_SIZE";
pub const ENV_DEVICE_CACHE_TTL_SECS: &str = "ALERT_DEVICE_CACHE_TTL_SECS";

/// Configuration injected into the dispatcher at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Account whose records are classified. Records keyed for any other
    /// account never match.
    pub account_id: String,

    /// Base URL for links in alert bodies, without a trailing slash.
    pub base_url: String,

    /// Records processed concurrently. 1 = sequential.
    /// Default: 1
    pub workers: usize,

    /// Upper bound on each resolve or publish call (None = unbounded).
    pub call_timeout: Option<Duration>,

    /// Devices cached between lookups (0 = no cache).
    /// Default: 0
    pub device_cache_size: usize,

    /// How long a cached device stays valid.
    /// Default: 60s
    pub device_cache_ttl: Duration,
}

impl DispatcherConfig {
    pub fn new(account_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            account_id: account_id.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            workers: 1,
            call_timeout: None,
            device_cache_size: 0,
            device_cache_ttl: Duration::from_secs(60),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn with_device_cache(mut self, size: usize, ttl: Duration) -> Self {
        self.device_cache_size = size;
        self.device_cache_ttl = ttl;
        self
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AlertError::Config(format!("{name} is not set")))
        };

        let mut config = Self::new(required(ENV_ACCOUNT_ID)?, required(ENV_BASE_URL)?);

        if let Some(workers) = parse_optional::<usize>(&lookup, ENV_WORKERS)? {
            config.workers = workers;
        }
        if let Some(ms) = parse_optional::<u64>(&lookup, ENV_CALL_TIMEOUT_MS)? {
            config.call_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(size) = parse_optional::<usize>(&lookup, ENV_DEVICE_CACHE_SIZE)? {
            config.device_cache_size = size;
        }
        if let Some(secs) = parse_optional::<u64>(&lookup, ENV_DEVICE_CACHE_TTL_SECS)? {
            config.device_cache_ttl = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration can be used for dispatch.
    pub fn validate(&self) -> Result<()> {
        if self.account_id.trim().is_empty() {
            return Err(AlertError::Config("account id is empty".into()));
        }
        if self.account_id.contains(':') {
            return Err(AlertError::Config(format!(
                "account id {:?} must not contain ':'",
                self.account_id
            )));
        }
        if self.base_url.trim().is_empty() {
            return Err(AlertError::Config("base url is empty".into()));
        }
        if self.workers == 0 {
            return Err(AlertError::Config("workers must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse_optional<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>> {
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AlertError::Config(format!("{name}={raw:?} is not a valid number"))),
        _ => Ok(None),
    }
}
