// config.rs

use crate::scraper::site::DEFAULT_DOMAIN;
use crate::scraper::Strategy;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONCURRENCY: usize = 5;
pub const MAX_CONCURRENCY: usize = 32;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

/// Waits applied around navigation and pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
    /// Grace after the page reports ready; the listing widget renders late.
    pub navigation_settle: Duration,
    pub page_settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            ready_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
            navigation_settle: Duration::from_secs(5),
            page_settle: Duration::from_secs(2),
        }
    }
}

impl Timing {
    #[cfg(test)]
    pub fn instant() -> Self {
        Self {
            ready_timeout: Duration::from_millis(200),
            poll_interval: Duration::ZERO,
            navigation_settle: Duration::ZERO,
            page_settle: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub concurrency: usize,
    pub timing: Timing,
    pub strategy: Strategy,
    pub headless: bool,
    pub preflight: bool,
    pub chrome_executable: Option<PathBuf>,
    pub site_domain: String,
    pub bind_addr: String,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timing: Timing::default(),
            strategy: Strategy::Auto,
            headless: true,
            preflight: true,
            chrome_executable: None,
            site_domain: DEFAULT_DOMAIN.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl ScrapeSettings {
    /// Reads settings from the process environment. Call `dotenvy::dotenv()` first
    /// if a `.env` file should be honored.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(n) = parse_var::<usize, _>(&lookup, "AUCTION_CONCURRENCY")? {
            settings.concurrency = clamp_concurrency(n);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "AUCTION_READY_TIMEOUT_SECS")? {
            settings.timing.ready_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "AUCTION_POLL_MS")? {
            settings.timing.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "AUCTION_SETTLE_SECS")? {
            settings.timing.navigation_settle = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "AUCTION_PAGE_SETTLE_SECS")? {
            settings.timing.page_settle = Duration::from_secs(secs);
        }
        if let Some(strategy) = parse_var::<Strategy, _>(&lookup, "AUCTION_STRATEGY")? {
            settings.strategy = strategy;
        }
        if let Some(flag) = parse_flag(&lookup, "AUCTION_HEADLESS")? {
            settings.headless = flag;
        }
        if let Some(flag) = parse_flag(&lookup, "AUCTION_PREFLIGHT")? {
            settings.preflight = flag;
        }
        if let Some(path) = lookup("CHROME_EXECUTABLE").filter(|v| !v.trim().is_empty()) {
            settings.chrome_executable = Some(PathBuf::from(path));
        }
        if let Some(domain) = lookup("AUCTION_SITE_DOMAIN").filter(|v| !v.trim().is_empty()) {
            settings.site_domain = domain.trim().to_string();
        }
        if let Some(addr) = lookup("BIND_ADDR").filter(|v| !v.trim().is_empty()) {
            settings.bind_addr = addr.trim().to_string();
        }

        Ok(settings)
    }
}

pub fn clamp_concurrency(n: usize) -> usize {
    n.clamp(1, MAX_CONCURRENCY)
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        }),
    }
}

fn parse_flag<F>(lookup: &F, key: &str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        }),
    }
}
