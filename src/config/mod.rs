//! Configuration module for the StudyHub sync layer.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://127.0.0.1:3001/api";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_PAGE_SIZE: usize = 12;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Sync layer configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST backend, without trailing slash
    pub api_url: String,
    /// Bearer token sent with every request
    pub api_token: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Page size used by scrolling screens
    pub page_size: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_url = env::var("STUDYHUB_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let api_token = env::var("STUDYHUB_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        let timeout_secs = positive_var("STUDYHUB_TIMEOUT_SECS").unwrap_or(DEFAULT_TIMEOUT_SECS);

        let page_size = positive_var("STUDYHUB_PAGE_SIZE")
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let log_level = env::var("STUDYHUB_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("STUDYHUB_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            api_url,
            api_token,
            request_timeout: Duration::from_secs(timeout_secs),
            page_size,
            log_level,
            log_format,
        }
    }
}

fn positive_var(name: &str) -> Option<u64> {
    env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both cases share one test so they never race on the process environment.
    #[test]
    fn test_config_from_env() {
        env::remove_var("STUDYHUB_API_URL");
        env::remove_var("STUDYHUB_API_TOKEN");
        env::remove_var("STUDYHUB_TIMEOUT_SECS");
        env::remove_var("STUDYHUB_PAGE_SIZE");
        env::remove_var("STUDYHUB_LOG_LEVEL");
        env::remove_var("STUDYHUB_LOG_FORMAT");

        let config = Config::from_env();

        assert_eq!(config.api_url, "http://127.0.0.1:3001/api");
        assert!(config.api_token.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.page_size, 12);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);

        env::set_var("STUDYHUB_API_URL", "https://api.example.test/v1/");
        env::set_var("STUDYHUB_PAGE_SIZE", "0");
        env::set_var("STUDYHUB_TIMEOUT_SECS", "soon");
        env::set_var("STUDYHUB_LOG_FORMAT", "json");

        let config = Config::from_env();

        assert_eq!(config.api_url, "https://api.example.test/v1");
        assert_eq!(config.page_size, 12);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.log_format, LogFormat::Json);

        env::remove_var("STUDYHUB_API_URL");
        env::remove_var("STUDYHUB_PAGE_SIZE");
        env::remove_var("STUDYHUB_TIMEOUT_SECS");
        env::remove_var("STUDYHUB_LOG_FORMAT");
    }
}
