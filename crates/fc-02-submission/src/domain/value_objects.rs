//! Value objects exchanged with the ordering service and commit notifiers.

use crate::domain::errors::PeerFailure;
use serde::{Deserialize, Serialize};
use shared_types::{TransactionId, ValidationCode};
use std::time::Duration;

/// Ordering service verdict on a broadcast. Success means queued, not committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BroadcastStatus {
    Success,
    BadRequest,
    Forbidden,
    ServiceUnavailable,
}

impl BroadcastStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BroadcastStatus::Success => "SUCCESS",
            BroadcastStatus::BadRequest => "BAD_REQUEST",
            BroadcastStatus::Forbidden => "FORBIDDEN",
            BroadcastStatus::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastAck {
    pub status: BroadcastStatus,
    #[serde(default)]
    pub info: String,
}

impl BroadcastAck {
    #[must_use]
    pub fn success() -> Self {
        Self {
            status: BroadcastStatus::Success,
            info: String::new(),
        }
    }

    #[must_use]
    pub fn rejected(status: BroadcastStatus, info: impl Into<String>) -> Self {
        Self {
            status,
            info: info.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == BroadcastStatus::Success
    }
}

/// Final status of a transaction as reported by a committing peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    pub tx_id: TransactionId,
    pub block_number: u64,
    pub validation_code: ValidationCode,
}

/// Whether `order` waits for the commit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitWait {
    /// Return as soon as the ordering service has queued the envelope.
    #[default]
    Skip,
    /// Wait for the commit event, at most `timeout`.
    Wait { timeout: Duration },
}

/// Result of a successfully ordered transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub tx_id: TransactionId,
    /// Chaincode response payload from the endorsements.
    pub result: Vec<u8>,
    pub endorsements: usize,
    /// Peers that did not endorse but were outvoted by the policy.
    pub failures: Vec<PeerFailure>,
    pub ack: BroadcastAck,
    /// Present when the flow waited for commit.
    pub commit: Option<CommitStatus>,
}
