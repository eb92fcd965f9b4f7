use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP behaviour shared by all provider clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connection timeout in seconds
    pub connect_timeout_seconds: u32,
    /// Upper bound for one provider call, including any polling it does
    pub call_timeout_seconds: u32,
    /// Delay between polls of a long-running analysis operation
    pub poll_interval_ms: u64,
    /// Polls before a long-running operation is abandoned
    pub max_polls: u32,
    /// User agent to send (crate name and version by default)
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: 10,
            call_timeout_seconds: 60,
            poll_interval_ms: 1000,
            max_polls: 60,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.connect_timeout_seconds))
    }

    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.call_timeout_seconds))
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(|| {
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HttpConfig::default();

        assert_eq!(config.call_timeout(), Duration::from_secs(60));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert!(config.user_agent().starts_with("guestdesk-core/"));
    }

    #[test]
    fn test_explicit_user_agent() {
        let config = HttpConfig {
            user_agent: Some("front-desk/2".into()),
            ..Default::default()
        };

        assert_eq!(config.user_agent(), "front-desk/2");
    }
}
