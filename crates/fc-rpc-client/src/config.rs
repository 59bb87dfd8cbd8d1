//! # RPC Transport Configuration

use crate::domain::errors::RpcError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Per-request HTTP timeout.
    pub request_timeout_ms: u64,

    /// How often an event source asks its peer for new blocks.
    pub poll_interval_ms: u64,

    /// Upper bound on blocks fetched per poll.
    pub max_blocks_per_poll: usize,

    /// Rewrite every profile endpoint host to `localhost`. For networks
    /// running in containers whose profile carries container host names.
    pub as_localhost: bool,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            poll_interval_ms: 500,
            max_blocks_per_poll: 64,
            as_localhost: true,
        }
    }
}

impl RpcConfig {
    pub fn for_testing() -> Self {
        Self {
            request_timeout_ms: 2_000,
            poll_interval_ms: 20,
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Parse a profile URL, applying `as_localhost`.
    pub fn endpoint(&self, url: &str) -> Result<Url, RpcError> {
        let invalid = |reason: String| RpcError::InvalidUrl {
            url: url.to_string(),
            reason,
        };
        let mut parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
        if self.as_localhost {
            parsed
                .set_host(Some("localhost"))
                .map_err(|e| invalid(e.to_string()))?;
        }
        Ok(parsed)
    }
}
