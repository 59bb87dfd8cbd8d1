//! Options a gateway is connected with.

use crate::ports::outbound::NetworkTransport;
use fc_01_identity::Wallet;
use fc_02_submission::EndorsementPolicy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// When `submit_transaction` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum CommitStrategy {
    /// As soon as the ordering service queued the transaction.
    None,
    /// Once one event-source peer reports the commit, at most `timeout_ms`.
    AnyPeer { timeout_ms: u64 },
}

impl Default for CommitStrategy {
    fn default() -> Self {
        CommitStrategy::AnyPeer { timeout_ms: 30_000 }
    }
}

impl CommitStrategy {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            CommitStrategy::None => None,
            CommitStrategy::AnyPeer { timeout_ms } => Some(Duration::from_millis(*timeout_ms)),
        }
    }
}

/// Endorser selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryOptions {
    /// Pick only as many endorsers as the policy needs, own organization
    /// first. Disabled: every endorsing peer in the profile.
    pub enabled: bool,
}

pub struct GatewayOptions {
    /// Wallet label of the identity to act as.
    pub identity: String,
    pub wallet: Arc<dyn Wallet>,
    pub transport: Arc<dyn NetworkTransport>,
    pub discovery: DiscoveryOptions,
    pub commit_strategy: CommitStrategy,
    pub policy: EndorsementPolicy,
    pub verify_endorsements: bool,
}

impl GatewayOptions {
    /// Defaults: no discovery, wait for commit on any peer, one endorsement.
    pub fn new(
        identity: impl Into<String>,
        wallet: Arc<dyn Wallet>,
        transport: Arc<dyn NetworkTransport>,
    ) -> Self {
        Self {
            identity: identity.into(),
            wallet,
            transport,
            discovery: DiscoveryOptions::default(),
            commit_strategy: CommitStrategy::default(),
            policy: EndorsementPolicy::default(),
            verify_endorsements: true,
        }
    }

    #[must_use]
    pub fn with_commit_strategy(mut self, strategy: CommitStrategy) -> Self {
        self.commit_strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_discovery(mut self, discovery: DiscoveryOptions) -> Self {
        self.discovery = discovery;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: EndorsementPolicy) -> Self {
        self.policy = policy;
        self
    }
}
