//! # Client and Channel Contexts
//!
//! Explicit, read-only handles produced by bootstrap and passed to the
//! submission flow and the event hub. Nothing here is global.
//!
//! ```text
//! ConnectionProfile + Wallet ──bootstrap──→ ClientContext ──channel()──→ ChannelContext
//! ```

use crate::config::BootstrapConfig;
use crate::domain::errors::BootstrapError;
use crate::domain::profile::{ChannelPeerRoles, ConnectionProfile};
use crate::ports::outbound::Wallet;
use shared_types::{ChannelId, MspId, PeerName, SigningIdentity};
use std::sync::Arc;
use tracing::{debug, info};

/// A bootstrapped client: profile plus the identity it acts as.
#[derive(Debug, Clone)]
pub struct ClientContext {
    profile: Arc<ConnectionProfile>,
    identity: SigningIdentity,
    user: String,
}

impl ClientContext {
    /// Resolve `user` in `wallet` and bind it to `profile`.
    ///
    /// Either returns a ready context or fails; never a half-initialised one.
    pub async fn bootstrap(
        profile: ConnectionProfile,
        user: &str,
        wallet: &dyn Wallet,
    ) -> Result<Self, BootstrapError> {
        let entry = wallet
            .get(user)
            .await?
            .ok_or_else(|| BootstrapError::IdentityNotFound {
                label: user.to_string(),
                wallet: wallet.location(),
            })?;

        let identity = entry
            .to_signing_identity()
            .map_err(|source| BootstrapError::InvalidIdentity {
                label: user.to_string(),
                source,
            })?;

        info!(
            user,
            msp_id = %identity.msp_id(),
            profile = %profile.name,
            "Client bootstrapped"
        );

        Ok(Self {
            profile: Arc::new(profile),
            identity,
            user: user.to_string(),
        })
    }

    /// Load profiles and the file system wallet named by `config`, then bootstrap.
    pub async fn from_config(config: &BootstrapConfig) -> Result<Self, BootstrapError> {
        let profile = config.load_profile()?;
        let wallet = config.wallet(&profile);
        debug!(wallet = %wallet.dir().display(), "Using file system wallet");

        Self::bootstrap(profile, &config.identity, &wallet).await
    }

    #[must_use]
    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    #[must_use]
    pub fn identity(&self) -> &SigningIdentity {
        &self.identity
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub fn msp_id(&self) -> &MspId {
        self.identity.msp_id()
    }

    /// Get a channel handle. Fails for channels the profile does not define
    /// or that list no peers.
    pub fn channel(&self, name: &str) -> Result<ChannelContext, BootstrapError> {
        let config = self
            .profile
            .channel(name)
            .ok_or_else(|| BootstrapError::ChannelNotFound {
                channel: name.to_string(),
            })?;

        if config.peers.is_empty() {
            return Err(BootstrapError::ChannelHasNoPeers {
                channel: name.to_string(),
            });
        }

        let peers = config
            .peers
            .iter()
            .map(|(peer, roles)| {
                let name = PeerName::new(peer.clone());
                ChannelPeer {
                    url: self.profile.peer_url(&name).unwrap_or_default().to_string(),
                    organization: self.profile.organization_of(&name).map(str::to_string),
                    name,
                    roles: *roles,
                }
            })
            .collect();

        let orderers = config
            .orderers
            .iter()
            .map(|o| OrdererEndpoint {
                name: o.clone(),
                url: self.profile.orderer_url(o).unwrap_or_default().to_string(),
            })
            .collect();

        Ok(ChannelContext {
            name: ChannelId::new(name),
            peers,
            orderers,
            identity: self.identity.clone(),
            client_organization: self.profile.client.organization.clone(),
        })
    }
}

/// One peer of a channel with its roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPeer {
    pub name: PeerName,
    pub url: String,
    pub organization: Option<String>,
    pub roles: ChannelPeerRoles,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdererEndpoint {
    pub name: String,
    pub url: String,
}

/// A channel as seen by one client identity.
#[derive(Debug, Clone)]
pub struct ChannelContext {
    name: ChannelId,
    peers: Vec<ChannelPeer>,
    orderers: Vec<OrdererEndpoint>,
    identity: SigningIdentity,
    client_organization: Option<String>,
}

impl ChannelContext {
    #[must_use]
    pub fn name(&self) -> &ChannelId {
        &self.name
    }

    #[must_use]
    pub fn identity(&self) -> &SigningIdentity {
        &self.identity
    }

    #[must_use]
    pub fn peers(&self) -> &[ChannelPeer] {
        &self.peers
    }

    #[must_use]
    pub fn orderers(&self) -> &[OrdererEndpoint] {
        &self.orderers
    }

    /// Look up a channel peer by name.
    pub fn peer(&self, name: &str) -> Result<&ChannelPeer, BootstrapError> {
        self.peers
            .iter()
            .find(|p| p.name.as_str() == name)
            .ok_or_else(|| BootstrapError::PeerNotFound {
                channel: self.name.to_string(),
                peer: name.to_string(),
            })
    }

    /// Every peer with the endorsing role, in profile order.
    #[must_use]
    pub fn endorsing_peers(&self) -> Vec<PeerName> {
        self.peers
            .iter()
            .filter(|p| p.roles.endorsing_peer)
            .map(|p| p.name.clone())
            .collect()
    }

    /// Endorsing peers of the client's own organization, or all endorsing
    /// peers when the profile names no client organization.
    #[must_use]
    pub fn local_endorsing_peers(&self) -> Vec<PeerName> {
        let Some(org) = &self.client_organization else {
            return self.endorsing_peers();
        };
        self.peers
            .iter()
            .filter(|p| p.roles.endorsing_peer && p.organization.as_deref() == Some(org))
            .map(|p| p.name.clone())
            .collect()
    }

    /// First peer that answers chaincode queries.
    #[must_use]
    pub fn query_peer(&self) -> Option<&ChannelPeer> {
        self.peers.iter().find(|p| p.roles.chaincode_query)
    }

    /// Peers that serve block events.
    #[must_use]
    pub fn event_sources(&self) -> Vec<PeerName> {
        self.peers
            .iter()
            .filter(|p| p.roles.event_source)
            .map(|p| p.name.clone())
            .collect()
    }
}
