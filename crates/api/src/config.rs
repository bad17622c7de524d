use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind: String,
    pub api_key: String,
    pub rate_limit_window: Duration,
    pub rate_limit_max: usize,
    pub session_ttl: Duration,
    /// Key the rate limiter on the first `x-forwarded-for` hop instead of the
    /// peer address. Only enable behind a proxy that sets the header.
    pub trust_forwarded_for: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            api_key: "dev-bloom-key".to_string(),
            rate_limit_window: Duration::from_secs(60),
            rate_limit_max: 120,
            session_ttl: Duration::from_secs(60 * 60),
            trust_forwarded_for: false,
        }
    }
}

impl ApiConfig {
    /// Reads `BLOOM_*` variables, keeping the default for anything unset or
    /// unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind: env::var("BLOOM_BIND").unwrap_or(defaults.bind),
            api_key: env::var("BLOOM_API_KEY")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.api_key),
            rate_limit_window: env_u64("BLOOM_RATE_LIMIT_WINDOW_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_limit_window),
            rate_limit_max: env_u64("BLOOM_RATE_LIMIT_MAX")
                .map(|value| value as usize)
                .unwrap_or(defaults.rate_limit_max),
            session_ttl: env_u64("BLOOM_SESSION_TTL_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            trust_forwarded_for: env_bool("BLOOM_TRUST_FORWARDED_FOR")
                .unwrap_or(defaults.trust_forwarded_for),
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    parse_bool(&env::var(key).ok()?)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
