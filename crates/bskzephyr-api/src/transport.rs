// Transport configuration for building the shared reqwest::Client.
//
// The Zephyr client normally receives a caller-owned `reqwest::Client`.
// This module is for callers that just want one built with sane defaults.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("bskzephyr/", env!("CARGO_PKG_VERSION"));

/// Settings for a `reqwest::Client` dedicated to the Zephyr cloud.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: USER_AGENT.into(),
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(Error::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_user_agent_names_crate() {
        let cfg = TransportConfig::default();
        assert!(cfg.user_agent.starts_with("bskzephyr/"));
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }

    #[test]
    fn builds_client_with_custom_timeout() {
        let cfg = TransportConfig::default().with_timeout(Duration::from_secs(5));
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert!(cfg.build_client().is_ok());
    }
}
