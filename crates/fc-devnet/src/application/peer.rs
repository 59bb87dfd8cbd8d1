//! # Development Peer
//!
//! Endorses proposals by simulating them against the shared ledger and
//! serves committed blocks through its deliver service.
//!
//! Endorsement steps:
//! 1. Check the client signature and that the tx id is bound to nonce and creator
//! 2. Find the installed chaincode
//! 3. Simulate through a fresh `ChaincodeStub`
//! 4. Sign the response payload with the peer identity

use crate::domain::ledger::Ledger;
use crate::domain::stub::ChaincodeStub;
use crate::ports::outbound::Chaincode;
use async_trait::async_trait;
use fc_03_event_hub::{BlockStream, DeliverError, EventSource};
use parking_lot::RwLock;
use shared_types::{
    ChaincodeId, ChaincodeResponse, EndorsedResponse, MspId, PeerName, ProposalResponse,
    ProposalResponsePayload, SignedProposal, SigningIdentity,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

/// Chaincodes installed on every peer of a network.
pub type ChaincodeRegistry = HashMap<ChaincodeId, Arc<dyn Chaincode>>;

/// How a peer answers proposals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PeerBehaviour {
    #[default]
    Healthy,
    /// Refuse every proposal with this message.
    Rejecting(String),
    /// Endorse, but with a read/write set no other peer produces.
    Divergent,
}

const STATUS_FORBIDDEN: i32 = 403;

pub struct DevPeer {
    name: PeerName,
    identity: SigningIdentity,
    ledger: Arc<Ledger>,
    chaincodes: Arc<ChaincodeRegistry>,
    behaviour: RwLock<PeerBehaviour>,
    proposals: AtomicU64,
}

impl DevPeer {
    pub fn new(
        name: PeerName,
        identity: SigningIdentity,
        ledger: Arc<Ledger>,
        chaincodes: Arc<ChaincodeRegistry>,
    ) -> Self {
        Self {
            name,
            identity,
            ledger,
            chaincodes,
            behaviour: RwLock::new(PeerBehaviour::Healthy),
            proposals: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn name(&self) -> &PeerName {
        &self.name
    }

    #[must_use]
    pub fn msp_id(&self) -> &MspId {
        self.identity.msp_id()
    }

    #[must_use]
    pub fn behaviour(&self) -> PeerBehaviour {
        self.behaviour.read().clone()
    }

    pub fn set_behaviour(&self, behaviour: PeerBehaviour) {
        debug!(peer = %self.name, ?behaviour, "Peer behaviour changed");
        *self.behaviour.write() = behaviour;
    }

    /// Proposals received, endorsed or not.
    #[must_use]
    pub fn proposals_processed(&self) -> u64 {
        self.proposals.load(Ordering::Relaxed)
    }

    fn fail(&self, status: i32, message: impl Into<String>) -> ProposalResponse {
        let message = message.into();
        debug!(peer = %self.name, status, %message, "Proposal not endorsed");
        ProposalResponse::failed(self.name.clone(), status, message)
    }

    /// Simulate and sign one proposal. Never errors: every problem becomes a
    /// failed response for this peer.
    pub fn process_proposal(&self, proposal: &SignedProposal) -> ProposalResponse {
        self.proposals.fetch_add(1, Ordering::Relaxed);

        let behaviour = self.behaviour();
        if let PeerBehaviour::Rejecting(message) = &behaviour {
            return self.fail(ChaincodeResponse::ERROR, message.clone());
        }

        if let Err(e) = proposal.verify() {
            return self.fail(STATUS_FORBIDDEN, format!("access denied: {e}"));
        }
        match proposal.proposal.tx_id_is_bound() {
            Ok(true) => {}
            Ok(false) => {
                return self.fail(
                    STATUS_FORBIDDEN,
                    "transaction id does not match nonce and creator",
                )
            }
            Err(e) => return self.fail(ChaincodeResponse::ERROR, e.to_string()),
        }
        let proposal_hash = match proposal.proposal.hash() {
            Ok(hash) => hash,
            Err(e) => return self.fail(ChaincodeResponse::ERROR, e.to_string()),
        };

        let header = &proposal.proposal.header;
        let invocation = &proposal.proposal.invocation;
        let Some(chaincode) = self.chaincodes.get(&invocation.chaincode_id) else {
            return self.fail(
                ChaincodeResponse::ERROR,
                format!(
                    "chaincode {} not installed on {}",
                    invocation.chaincode_id, self.name
                ),
            );
        };

        let mut stub = ChaincodeStub::new(
            &self.ledger,
            invocation.chaincode_id.clone(),
            header.tx_id.clone(),
            header.timestamp_ms,
        );
        let response = match chaincode.invoke(&mut stub, &invocation.function, &invocation.args) {
            Ok(payload) => ChaincodeResponse::success(payload),
            Err(e) => return self.fail(ChaincodeResponse::ERROR, e.to_string()),
        };
        let (mut results, event) = stub.finish();
        if behaviour == PeerBehaviour::Divergent {
            results.record_write(
                &format!("divergent-{}", self.name),
                Some(self.name.as_str().as_bytes().to_vec()),
            );
        }

        let payload = ProposalResponsePayload {
            proposal_hash,
            results,
            response,
            event,
        };
        match EndorsedResponse::endorse(payload, &self.identity) {
            Ok(endorsed) => {
                debug!(
                    peer = %self.name,
                    tx_id = %header.tx_id.short(),
                    function = %invocation.function,
                    "Proposal endorsed"
                );
                ProposalResponse::endorsed(self.name.clone(), endorsed)
            }
            Err(e) => self.fail(ChaincodeResponse::ERROR, e.to_string()),
        }
    }
}

#[async_trait]
impl EventSource for DevPeer {
    fn peer(&self) -> &PeerName {
        &self.name
    }

    async fn deliver(&self, start_block: Option<u64>) -> Result<BlockStream, DeliverError> {
        let (history, live) = match start_block {
            None => (Vec::new(), self.ledger.subscribe()),
            Some(start) => {
                let height = self.ledger.height();
                if start > height {
                    return Err(DeliverError::BlockNotFound {
                        peer: self.name.clone(),
                        requested: start,
                        height,
                    });
                }
                self.ledger.subscribe_from(start)
            }
        };

        let peer = self.name.clone();
        let live = BroadcastStream::new(live).map(move |item| {
            item.map_err(|e: BroadcastStreamRecvError| {
                warn!(peer = %peer, error = %e, "Deliver stream fell behind");
                DeliverError::Protocol {
                    peer: peer.clone(),
                    reason: e.to_string(),
                }
            })
        });
        Ok(Box::pin(
            tokio_stream::iter(history.into_iter().map(Ok)).chain(live),
        ))
    }
}
