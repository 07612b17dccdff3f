//! Provider configuration

use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
pub const API_VERSION: &str = "2021-06-01";
pub const MAX_POLL_ATTEMPTS: u32 = 720;

/// Per-operation deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(60 * 60),
            read: Duration::from_secs(5 * 60),
            update: Duration::from_secs(60 * 60),
            delete: Duration::from_secs(60 * 60),
        }
    }
}

/// Settings shared by the ARM client and the orchestrator
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub subscription_id: String,
    /// Base URL of the resource manager (no trailing slash)
    pub endpoint: String,
    pub api_version: String,
    /// Bearer token. Token acquisition happens outside this crate.
    pub access_token: String,
    /// Delay between two polls of a long-running operation
    pub poll_interval: Duration,
    /// Polls before a long-running operation is given up on
    pub max_poll_attempts: u32,
    pub timeouts: Timeouts,
}

impl ProviderConfig {
    pub fn new(subscription_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_version: API_VERSION.to_string(),
            access_token: access_token.into(),
            poll_interval: Duration::from_secs(10),
            max_poll_attempts: MAX_POLL_ATTEMPTS,
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ProviderConfig::new("sub", "token");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.api_version, "2021-06-01");
        assert_eq!(config.timeouts.create, Duration::from_secs(3600));
        assert_eq!(config.timeouts.read, Duration::from_secs(300));
        assert_eq!(config.max_poll_attempts, 720);
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let config = ProviderConfig::new("sub", "token").with_endpoint("http://localhost:8080/");
        assert_eq!(config.endpoint, "http://localhost:8080");
    }
}
