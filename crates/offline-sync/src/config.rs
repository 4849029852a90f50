use std::time::Duration;

use fitlog_core::sync::{DEFAULT_RETRY_BASE_DELAY_MS, MAX_REQUEST_RETRIES};

pub const DEFAULT_API_URL: &str = "http://localhost:3001";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const API_URL_ENV: &str = "FITLOG_API_URL";
pub const API_TIMEOUT_ENV: &str = "FITLOG_API_TIMEOUT_MS";
pub const RETRY_BASE_DELAY_ENV: &str = "FITLOG_RETRY_BASE_DELAY_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: MAX_REQUEST_RETRIES,
            retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank or
    /// unparseable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let api_base_url = lookup(API_URL_ENV)
            .as_deref()
            .and_then(normalize_base_url)
            .unwrap_or(defaults.api_base_url);
        let timeout = lookup(API_TIMEOUT_ENV)
            .as_deref()
            .and_then(parse_millis)
            .unwrap_or(defaults.timeout);
        let retry_base_delay = lookup(RETRY_BASE_DELAY_ENV)
            .as_deref()
            .and_then(parse_millis)
            .unwrap_or(defaults.retry_base_delay);

        Self {
            api_base_url,
            timeout,
            max_retries: defaults.max_retries,
            retry_base_delay,
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        if let Some(url) = normalize_base_url(url) {
            self.api_base_url = url;
        }
        self
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_millis(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().map(Duration::from_millis)
}
