use std::env;

const DEFAULT_RELAY_URL: &str = "https://relay.cove.example";
const DEFAULT_POLL_MS: u64 = 2000;

/// CLI configuration, environment-driven with flag overrides on top.
#[derive(Debug, Clone)]
pub struct Config {
    pub relay_url: String,
    pub poll_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let relay_url =
            env::var("COVE_RELAY_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string());
        let poll_ms = env::var("COVE_POLL_MS")
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or(DEFAULT_POLL_MS);
        Self { relay_url, poll_ms }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_string(),
            poll_ms: DEFAULT_POLL_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_constants() {
        let config = Config::default();
        assert_eq!(config.relay_url, DEFAULT_RELAY_URL);
        assert_eq!(config.poll_ms, DEFAULT_POLL_MS);
    }
}
