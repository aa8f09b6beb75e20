//! Client connection settings

use crate::client::transport::DEFAULT_USER_AGENT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Where the API lives and how to reach it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server origin, without the API prefix
    pub base_url: String,
    /// Fixed prefix every resource path hangs off
    pub api_prefix: String,
    /// Request timeout; unset means the transport default (native only)
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout_secs: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Base URL joined with the API prefix, no trailing slash
    pub fn api_url(&self) -> String {
        join_api_url(&self.base_url, &self.api_prefix)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }
}

pub(crate) fn join_api_url(base_url: &str, prefix: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{prefix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        assert_eq!(ClientConfig::default().api_url(), "http://localhost:8000/api/v1");

        let config = ClientConfig {
            base_url: "https://gst.example.in/".into(),
            api_prefix: "api/v1/".into(),
            ..Default::default()
        };
        assert_eq!(config.api_url(), "https://gst.example.in/api/v1");
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = ClientConfig {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(config.timeout(), None);
    }
}
