// Environment configuration shared by arena binaries

use std::env;

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_PISTON_URL: &str = "http://localhost:2000/api/v2";
pub const DEFAULT_LANGUAGES_CONFIG: &str = "config/languages.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub piston_url: String,
    pub languages_config: String,
    /// Language slugs this worker serves; empty means every configured one
    pub worker_languages: Vec<String>,
    pub concurrency: usize,
    pub poll_timeout_seconds: f64,
    pub json_logs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: DEFAULT_REDIS_URL.to_string(),
            piston_url: DEFAULT_PISTON_URL.to_string(),
            languages_config: DEFAULT_LANGUAGES_CONFIG.to_string(),
            worker_languages: Vec::new(),
            concurrency: 4,
            poll_timeout_seconds: 5.0,
            json_logs: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparsable values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            redis_url: lookup("REDIS_URL").unwrap_or(defaults.redis_url),
            piston_url: lookup("PISTON_URL").unwrap_or(defaults.piston_url),
            languages_config: lookup("LANGUAGES_CONFIG").unwrap_or(defaults.languages_config),
            worker_languages: lookup("WORKER_LANGUAGES")
                .map(|raw| parse_list(&raw))
                .unwrap_or(defaults.worker_languages),
            concurrency: lookup("WORKER_CONCURRENCY")
                .and_then(|raw| raw.trim().parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.concurrency),
            poll_timeout_seconds: defaults.poll_timeout_seconds,
            json_logs: lookup("LOG_FORMAT")
                .map(|raw| raw.eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.json_logs),
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
