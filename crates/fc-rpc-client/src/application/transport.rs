//! # RPC Transport
//!
//! Implements the submission ports over JSON-RPC. Peers are called one at a
//! time in target order. A peer that cannot be reached or answers with an
//! error becomes a failed proposal response for that peer, so one bad peer
//! never aborts a proposal round.

use crate::application::client::RpcClient;
use crate::application::events::RpcEventSource;
use crate::config::RpcConfig;
use crate::domain::errors::RpcError;
use crate::domain::jsonrpc::methods;
use async_trait::async_trait;
use fc_01_identity::ConnectionProfile;
use fc_02_submission::{BroadcastAck, EndorsementTransport, OrderingService, TransportError};
use fc_03_event_hub::EventSource;
use fc_04_gateway::NetworkTransport;
use reqwest::Url;
use shared_types::{PeerName, ProposalResponse, SignedProposal, TransactionEnvelope};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Status reported for a peer that could not be reached.
pub const STATUS_UNREACHABLE: i32 = 503;

/// Status reported for a peer that answered with an error.
pub const STATUS_REMOTE_ERROR: i32 = 500;

#[derive(Clone)]
pub struct RpcTransport {
    client: Arc<RpcClient>,
    config: RpcConfig,
    peers: BTreeMap<PeerName, Url>,
    orderer: Url,
}

impl RpcTransport {
    pub fn new(
        config: RpcConfig,
        peers: BTreeMap<PeerName, Url>,
        orderer: Url,
    ) -> Result<Self, RpcError> {
        Ok(Self {
            client: Arc::new(RpcClient::new(&config)?),
            config,
            peers,
            orderer,
        })
    }

    /// Endpoints of `channel`: its peers, and its first orderer.
    pub fn from_profile(
        profile: &ConnectionProfile,
        channel: &str,
        config: RpcConfig,
    ) -> Result<Self, RpcError> {
        let missing = |what: String| RpcError::InvalidUrl {
            url: String::new(),
            reason: what,
        };
        let channel_config = profile
            .channel(channel)
            .ok_or_else(|| missing(format!("channel {channel} not in profile")))?;

        let mut peers = BTreeMap::new();
        for name in channel_config.peers.keys() {
            let peer = PeerName::new(name.clone());
            let url = profile
                .peer_url(&peer)
                .ok_or_else(|| missing(format!("peer {name} has no url")))?;
            peers.insert(peer, config.endpoint(url)?);
        }

        let orderer_name = channel_config
            .orderers
            .first()
            .ok_or_else(|| missing(format!("channel {channel} has no orderer")))?;
        let orderer = config.endpoint(
            profile
                .orderer_url(orderer_name)
                .ok_or_else(|| missing(format!("orderer {orderer_name} has no url")))?,
        )?;

        debug!(channel, peers = peers.len(), %orderer, "RPC transport configured");
        Self::new(config, peers, orderer)
    }

    #[must_use]
    pub fn peer_endpoint(&self, peer: &PeerName) -> Option<&Url> {
        self.peers.get(peer)
    }

    async fn propose_to(&self, peer: &PeerName, proposal: &SignedProposal) -> ProposalResponse {
        let Some(url) = self.peers.get(peer) else {
            return ProposalResponse::failed(
                peer.clone(),
                STATUS_UNREACHABLE,
                format!("no endpoint configured for {peer}"),
            );
        };

        match self
            .client
            .call::<_, ProposalResponse>(url, methods::PROCESS_PROPOSAL, [proposal])
            .await
        {
            Ok(response) => answered_by(peer, response),
            Err(e) => {
                warn!(%peer, error = %e, "Proposal not delivered");
                let status = if e.is_connection_failure() {
                    STATUS_UNREACHABLE
                } else {
                    STATUS_REMOTE_ERROR
                };
                ProposalResponse::failed(peer.clone(), status, e.to_string())
            }
        }
    }
}

/// Keep a remote response only if it names the peer that was asked. Any
/// other responder becomes a failure for that target.
fn answered_by(peer: &PeerName, response: ProposalResponse) -> ProposalResponse {
    if response.peer == *peer {
        return response;
    }
    warn!(%peer, responder = %response.peer, "Proposal answered under another peer name");
    ProposalResponse::failed(
        peer.clone(),
        STATUS_REMOTE_ERROR,
        format!("responder mismatch: answered as {}", response.peer),
    )
}

#[async_trait]
impl EndorsementTransport for RpcTransport {
    async fn send_proposal(
        &self,
        targets: &[PeerName],
        proposal: &SignedProposal,
    ) -> Result<Vec<ProposalResponse>, TransportError> {
        let mut responses = Vec::with_capacity(targets.len());
        for peer in targets {
            responses.push(self.propose_to(peer, proposal).await);
        }
        Ok(responses)
    }
}

#[async_trait]
impl OrderingService for RpcTransport {
    async fn broadcast(&self, envelope: &TransactionEnvelope) -> Result<BroadcastAck, TransportError> {
        self.client
            .call(&self.orderer, methods::BROADCAST, [envelope])
            .await
            .map_err(|e| {
                let endpoint = self.orderer.to_string();
                if e.is_connection_failure() {
                    TransportError::Unreachable {
                        endpoint,
                        reason: e.to_string(),
                    }
                } else {
                    TransportError::Protocol {
                        endpoint,
                        reason: e.to_string(),
                    }
                }
            })
    }
}

impl NetworkTransport for RpcTransport {
    fn endorser(&self) -> Arc<dyn EndorsementTransport> {
        Arc::new(self.clone())
    }

    fn orderer(&self) -> Arc<dyn OrderingService> {
        Arc::new(self.clone())
    }

    fn event_source(&self, peer: &PeerName) -> Option<Arc<dyn EventSource>> {
        let url = self.peers.get(peer)?;
        Some(Arc::new(RpcEventSource::new(
            Arc::clone(&self.client),
            peer.clone(),
            url.clone(),
            &self.config,
        )))
    }
}
