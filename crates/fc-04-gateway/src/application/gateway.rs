//! # Gateway
//!
//! One connection to a network for one identity. Networks are opened lazily
//! and cached per channel name.

use crate::application::network::Network;
use crate::domain::errors::GatewayError;
use crate::domain::options::{CommitStrategy, DiscoveryOptions, GatewayOptions};
use crate::ports::outbound::NetworkTransport;
use dashmap::DashMap;
use fc_01_identity::{BootstrapError, ClientContext, ConnectionProfile};
use fc_02_submission::SubmissionConfig;
use shared_types::SigningIdentity;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub struct Gateway {
    client: ClientContext,
    transport: Arc<dyn NetworkTransport>,
    discovery: DiscoveryOptions,
    commit_strategy: CommitStrategy,
    submission: SubmissionConfig,
    networks: DashMap<String, Network>,
    // Serializes first opens so a channel never gets two event hubs.
    opening: Mutex<()>,
}

impl Gateway {
    /// Bootstrap `options.identity` from `options.wallet` against `profile`.
    pub async fn connect(
        profile: ConnectionProfile,
        options: GatewayOptions,
    ) -> Result<Self, GatewayError> {
        profile.validate().map_err(BootstrapError::from)?;
        let client =
            ClientContext::bootstrap(profile, &options.identity, options.wallet.as_ref()).await?;

        info!(
            identity = %options.identity,
            discovery = options.discovery.enabled,
            "Gateway connected"
        );

        Ok(Self {
            client,
            transport: options.transport,
            discovery: options.discovery,
            commit_strategy: options.commit_strategy,
            submission: SubmissionConfig {
                policy: options.policy,
                verify_endorsements: options.verify_endorsements,
                ..SubmissionConfig::default()
            },
            networks: DashMap::new(),
            opening: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn client(&self) -> &ClientContext {
        &self.client
    }

    #[must_use]
    pub fn identity(&self) -> &SigningIdentity {
        self.client.identity()
    }

    #[must_use]
    pub fn commit_strategy(&self) -> CommitStrategy {
        self.commit_strategy
    }

    /// The network for channel `name`, opened on first request.
    pub async fn network(&self, name: &str) -> Result<Network, GatewayError> {
        if let Some(network) = self.networks.get(name) {
            return Ok(network.clone());
        }

        let _guard = self.opening.lock().await;
        if let Some(network) = self.networks.get(name) {
            return Ok(network.clone());
        }

        let channel = self.client.channel(name)?;
        let network = Network::open(
            channel,
            Arc::clone(&self.transport),
            self.discovery,
            self.commit_strategy,
            self.submission.clone(),
        )
        .await?;
        self.networks.insert(name.to_string(), network.clone());
        Ok(network)
    }

    /// Close every opened network. Handles already given out keep working
    /// for submissions but lose their events.
    pub async fn disconnect(&self) {
        let networks: Vec<Network> = self.networks.iter().map(|n| n.value().clone()).collect();
        self.networks.clear();
        for network in networks {
            network.close().await;
        }
        info!(identity = %self.client.user(), "Gateway disconnected");
    }
}
