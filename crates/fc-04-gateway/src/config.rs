//! # Gateway Configuration

use crate::domain::options::{CommitStrategy, DiscoveryOptions, GatewayOptions};
use crate::ports::outbound::NetworkTransport;
use fc_01_identity::Wallet;
use fc_02_submission::EndorsementPolicy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Serializable half of [`GatewayOptions`]: everything except the wallet
/// and the transport, which are built at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Wallet label to connect as.
    pub identity: String,

    pub channel: String,

    pub chaincode: String,

    pub discovery: DiscoveryOptions,

    pub commit_strategy: CommitStrategy,

    pub policy: EndorsementPolicy,

    pub verify_endorsements: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            identity: "Admin@requirements.oem.com".to_string(),
            channel: "oem-channel".to_string(),
            chaincode: "oemcc".to_string(),
            discovery: DiscoveryOptions::default(),
            commit_strategy: CommitStrategy::default(),
            policy: EndorsementPolicy::default(),
            verify_endorsements: true,
        }
    }
}

impl GatewayConfig {
    /// Short commit timeout for tests.
    pub fn for_testing() -> Self {
        Self {
            commit_strategy: CommitStrategy::AnyPeer { timeout_ms: 2_000 },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn options(
        &self,
        wallet: Arc<dyn Wallet>,
        transport: Arc<dyn NetworkTransport>,
    ) -> GatewayOptions {
        GatewayOptions {
            verify_endorsements: self.verify_endorsements,
            ..GatewayOptions::new(self.identity.clone(), wallet, transport)
                .with_discovery(self.discovery)
                .with_commit_strategy(self.commit_strategy)
                .with_policy(self.policy)
        }
    }
}
