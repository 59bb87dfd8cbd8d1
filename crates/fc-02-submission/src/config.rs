//! # Submission Configuration

use crate::domain::policy::EndorsementPolicy;
use crate::domain::value_objects::CommitWait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Defaults for every submission made by one `TransactionSubmitter`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Endorsements required before ordering.
    pub policy: EndorsementPolicy,

    /// Check each peer's endorsement signature before ordering.
    pub verify_endorsements: bool,

    /// Wait for the commit event after the ordering ack.
    pub wait_for_commit: bool,

    /// Upper bound on the commit wait.
    pub commit_timeout_ms: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            policy: EndorsementPolicy::default(),
            verify_endorsements: true,
            wait_for_commit: false,
            commit_timeout_ms: 30_000,
        }
    }
}

impl SubmissionConfig {
    /// Small timeouts for tests.
    pub fn for_testing() -> Self {
        Self {
            commit_timeout_ms: 500,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn commit_timeout(&self) -> Duration {
        Duration::from_millis(self.commit_timeout_ms)
    }

    /// The commit behaviour implied by this config.
    #[must_use]
    pub fn commit_wait(&self) -> CommitWait {
        if self.wait_for_commit {
            CommitWait::Wait {
                timeout: self.commit_timeout(),
            }
        } else {
            CommitWait::Skip
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SubmissionConfig::default();
        assert_eq!(config.policy, EndorsementPolicy::AtLeast(1));
        assert!(config.verify_endorsements);
        assert_eq!(config.commit_wait(), CommitWait::Skip);
    }

    #[test]
    fn test_commit_wait_uses_timeout() {
        let config = SubmissionConfig {
            wait_for_commit: true,
            commit_timeout_ms: 1500,
            ..SubmissionConfig::default()
        };
        assert_eq!(
            config.commit_wait(),
            CommitWait::Wait {
                timeout: Duration::from_millis(1500)
            }
        );
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: SubmissionConfig =
            serde_json::from_str(r#"{"policy":"majority","wait_for_commit":true}"#).unwrap();
        assert_eq!(config.policy, EndorsementPolicy::Majority);
        assert!(config.wait_for_commit);
        assert_eq!(config.commit_timeout_ms, 30_000);
    }
}
