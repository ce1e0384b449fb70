//! Environment-driven service settings.
//!
//! Everything has a default so the service starts with no configuration
//! at all. A `.env` file is honored when present.

use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CACHE_PATH: &str = "symbol_cache_us.json";
const DEFAULT_CACHE_TTL_SECS: u64 = 86_400;
const DEFAULT_MAX_WORKERS: usize = 12;

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub cache_path: String,
    pub cache_ttl: Duration,
    pub max_workers: usize,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        let port = env_parsed("PORT").unwrap_or(DEFAULT_PORT);
        let cache_path = std::env::var("SCREENER_CACHE_PATH")
            .unwrap_or_else(|_| DEFAULT_CACHE_PATH.to_string());
        let ttl_secs = env_parsed("SCREENER_CACHE_TTL_SECS").unwrap_or(DEFAULT_CACHE_TTL_SECS);
        let max_workers: usize = env_parsed("SCREENER_MAX_WORKERS").unwrap_or(DEFAULT_MAX_WORKERS);

        Self {
            port,
            cache_path,
            cache_ttl: Duration::from_secs(ttl_secs),
            max_workers: max_workers.max(1),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parsed_rejects_garbage() {
        std::env::set_var("SCREENER_TEST_BAD_NUMBER", "not-a-number");
        let parsed: Option<u16> = env_parsed("SCREENER_TEST_BAD_NUMBER");
        assert_eq!(parsed, None);
        std::env::remove_var("SCREENER_TEST_BAD_NUMBER");
    }

    #[test]
    fn env_parsed_reads_numbers() {
        std::env::set_var("SCREENER_TEST_GOOD_NUMBER", "9090");
        let parsed: Option<u16> = env_parsed("SCREENER_TEST_GOOD_NUMBER");
        assert_eq!(parsed, Some(9090));
        std::env::remove_var("SCREENER_TEST_GOOD_NUMBER");
    }
}
