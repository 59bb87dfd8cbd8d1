//! # Development Network
//!
//! Peers, one ordering service and one ledger in a single process, wired
//! to the client's outbound ports:
//!
//! ```text
//! EndorsementTransport ──→ DevPeer::process_proposal (each target, in order)
//! OrderingService      ──→ DevOrderer ──→ Ledger::commit ──→ deliver streams
//! EventSource          ──→ DevPeer (any peer of the network)
//! ```

use crate::adapters::OemContract;
use crate::application::orderer::DevOrderer;
use crate::application::peer::{ChaincodeRegistry, DevPeer, PeerBehaviour};
use crate::config::DevnetConfig;
use crate::domain::errors::DevnetError;
use crate::domain::ledger::Ledger;
use crate::ports::outbound::Chaincode;
use async_trait::async_trait;
use fc_01_identity::ConnectionProfile;
use fc_02_submission::{
    BroadcastAck, EndorsementTransport, OrderingService, TransportError,
};
use fc_03_event_hub::EventSource;
use fc_04_gateway::NetworkTransport;
use shared_types::{
    MspId, PeerName, ProposalResponse, SignedProposal, SigningIdentity, TransactionEnvelope,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

const STATUS_UNAVAILABLE: i32 = 503;

pub struct DevNetwork {
    ledger: Arc<Ledger>,
    peers: BTreeMap<PeerName, Arc<DevPeer>>,
    orderer: Arc<DevOrderer>,
}

pub struct DevNetworkBuilder {
    config: DevnetConfig,
    peers: Vec<(PeerName, MspId)>,
    chaincodes: Vec<Arc<dyn Chaincode>>,
}

impl DevNetworkBuilder {
    fn new(config: DevnetConfig) -> Self {
        Self {
            config,
            peers: Vec::new(),
            chaincodes: Vec::new(),
        }
    }

    #[must_use]
    pub fn peer(mut self, name: impl Into<PeerName>, msp_id: impl Into<MspId>) -> Self {
        self.peers.push((name.into(), msp_id.into()));
        self
    }

    #[must_use]
    pub fn chaincode(mut self, chaincode: Arc<dyn Chaincode>) -> Self {
        self.chaincodes.push(chaincode);
        self
    }

    /// Install the OEM contract under the configured chaincode id.
    #[must_use]
    pub fn oem_contract(self) -> Self {
        let id = self.config.chaincode.clone();
        self.chaincode(Arc::new(OemContract::new(id)))
    }

    pub fn build(self) -> Result<Arc<DevNetwork>, DevnetError> {
        if self.peers.is_empty() {
            return Err(DevnetError::NoPeers);
        }

        let ledger = Arc::new(Ledger::new(self.config.block_capacity));
        let chaincodes: Arc<ChaincodeRegistry> = Arc::new(
            self.chaincodes
                .into_iter()
                .map(|c| (c.id().clone(), c))
                .collect(),
        );

        let mut peers = BTreeMap::new();
        for (name, msp_id) in self.peers {
            if peers.contains_key(&name) {
                return Err(DevnetError::DuplicatePeer(name.to_string()));
            }
            let peer = DevPeer::new(
                name.clone(),
                SigningIdentity::generate(msp_id),
                Arc::clone(&ledger),
                Arc::clone(&chaincodes),
            );
            peers.insert(name, Arc::new(peer));
        }

        let orderer = Arc::new(DevOrderer::new(
            Arc::clone(&ledger),
            self.config.min_endorsements,
        ));

        info!(
            peers = peers.len(),
            chaincodes = chaincodes.len(),
            min_endorsements = orderer.min_endorsements(),
            "Development network started"
        );

        Ok(Arc::new(DevNetwork {
            ledger,
            peers,
            orderer,
        }))
    }
}

impl DevNetwork {
    pub fn builder(config: DevnetConfig) -> DevNetworkBuilder {
        DevNetworkBuilder::new(config)
    }

    /// One peer per profile peer, with the MSP id of its organization, and
    /// the OEM contract installed.
    pub fn from_profile(
        profile: &ConnectionProfile,
        config: DevnetConfig,
    ) -> Result<Arc<Self>, DevnetError> {
        let mut builder = Self::builder(config).oem_contract();
        for name in profile.peers.keys() {
            let peer = PeerName::new(name.clone());
            let msp_id = profile
                .organization_of(&peer)
                .and_then(|org| profile.organizations.get(org))
                .map(|org| org.mspid.clone())
                .ok_or_else(|| DevnetError::UnknownOrganization { peer: name.clone() })?;
            builder = builder.peer(peer, msp_id);
        }
        builder.build()
    }

    #[must_use]
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    #[must_use]
    pub fn orderer(&self) -> &Arc<DevOrderer> {
        &self.orderer
    }

    #[must_use]
    pub fn peer(&self, name: &str) -> Option<&Arc<DevPeer>> {
        self.peers.get(&PeerName::new(name))
    }

    pub fn peers(&self) -> impl Iterator<Item = &Arc<DevPeer>> {
        self.peers.values()
    }

    /// Change how `peer` answers proposals. False for an unknown peer.
    pub fn set_behaviour(&self, peer: &str, behaviour: PeerBehaviour) -> bool {
        match self.peer(peer) {
            Some(p) => {
                p.set_behaviour(behaviour);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl EndorsementTransport for DevNetwork {
    async fn send_proposal(
        &self,
        targets: &[PeerName],
        proposal: &SignedProposal,
    ) -> Result<Vec<ProposalResponse>, TransportError> {
        Ok(targets
            .iter()
            .map(|target| match self.peers.get(target) {
                Some(peer) => peer.process_proposal(proposal),
                None => ProposalResponse::failed(
                    target.clone(),
                    STATUS_UNAVAILABLE,
                    format!("peer {target} is not part of this network"),
                ),
            })
            .collect())
    }
}

#[async_trait]
impl OrderingService for DevNetwork {
    async fn broadcast(&self, envelope: &TransactionEnvelope) -> Result<BroadcastAck, TransportError> {
        self.orderer.broadcast(envelope).await
    }
}

/// `NetworkTransport` over a shared [`DevNetwork`].
#[derive(Clone)]
pub struct DevTransport(pub Arc<DevNetwork>);

impl NetworkTransport for DevTransport {
    fn endorser(&self) -> Arc<dyn EndorsementTransport> {
        self.0.clone()
    }

    fn orderer(&self) -> Arc<dyn OrderingService> {
        self.0.clone()
    }

    fn event_source(&self, peer: &PeerName) -> Option<Arc<dyn EventSource>> {
        self.0
            .peers
            .get(peer)
            .map(|p| Arc::clone(p) as Arc<dyn EventSource>)
    }
}
