use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Config {
    /// Account whose statistics are served. Absence is reported per request.
    pub github_username: Option<String>,
    pub github_token: Option<String>,
    pub api_base_url: String,
    pub bind_addr: String,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_username: None,
            github_token: None,
            api_base_url: DEFAULT_API_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let github_username = get("GITHUB_USERNAME");
        let github_token = get("GITHUB_TOKEN");

        let api_base_url = get("GITHUB_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "GITHUB_API_URL must be an http(s) URL, got {}",
                api_base_url
            )));
        }

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let cache_ttl = get("CACHE_TTL_SECS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CACHE_TTL);

        let request_timeout = get("REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .filter(|secs: &u64| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        Ok(Self {
            github_username,
            github_token,
            api_base_url,
            bind_addr,
            cache_ttl,
            request_timeout,
        })
    }
}
