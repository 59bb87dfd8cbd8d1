//! Outbound Ports (Driven Ports / SPI)
//!
//! What the submission flow needs from the network. Implemented by the
//! in-process development network and by the JSON-RPC transport.

use crate::domain::errors::TransportError;
use crate::domain::value_objects::{BroadcastAck, CommitStatus};
use async_trait::async_trait;
use shared_types::{PeerName, ProposalResponse, SignedProposal, TransactionEnvelope, TransactionId};
use tokio::sync::oneshot;

/// Sends a signed proposal to endorsing peers.
#[async_trait]
pub trait EndorsementTransport: Send + Sync {
    /// One batched call. Returns exactly one response per target, in target
    /// order; a peer that cannot be reached is reported as a failed response.
    /// `Err` means the call as a whole failed.
    async fn send_proposal(
        &self,
        targets: &[PeerName],
        proposal: &SignedProposal,
    ) -> Result<Vec<ProposalResponse>, TransportError>;
}

/// Broadcasts envelopes to the ordering service.
#[async_trait]
pub trait OrderingService: Send + Sync {
    /// The ack confirms queuing for block inclusion only.
    async fn broadcast(&self, envelope: &TransactionEnvelope) -> Result<BroadcastAck, TransportError>;
}

/// Reports the commit of a transaction.
#[async_trait]
pub trait CommitNotifier: Send + Sync {
    /// Start watching for `tx_id`. Call before broadcasting so the commit
    /// event cannot be missed.
    async fn register(
        &self,
        tx_id: &TransactionId,
    ) -> Result<oneshot::Receiver<CommitStatus>, TransportError>;

    /// Stop watching for `tx_id`.
    fn cancel(&self, tx_id: &TransactionId);
}

/// Mock implementations for testing
#[cfg(test)]
pub mod mocks {
    use super::*;
    use parking_lot::Mutex;
    use shared_types::{
        ChaincodeResponse, EndorsedResponse, ProposalResponsePayload, ReadWriteSet,
        SigningIdentity, ValidationCode,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// How a mock peer answers.
    #[derive(Debug, Clone)]
    pub enum PeerBehaviour {
        Endorse,
        Fail(String),
        /// Endorse with a different write set than its peers.
        Diverge,
    }

    /// Endorsement over `proposal` writing `value` to `REQ-1`.
    pub fn endorse_for(proposal: &SignedProposal, value: &[u8]) -> EndorsedResponse {
        let peer = SigningIdentity::generate("PeerMSP");
        let mut results = ReadWriteSet::default();
        results.record_write("REQ-1", Some(value.to_vec()));
        let payload = ProposalResponsePayload {
            proposal_hash: proposal.proposal.hash().unwrap(),
            results,
            response: ChaincodeResponse::success(b"ok".to_vec()),
            event: None,
        };
        EndorsedResponse::endorse(payload, &peer).unwrap()
    }

    pub struct MockEndorser {
        behaviours: Vec<PeerBehaviour>,
        drop_last: bool,
        calls: AtomicUsize,
    }

    impl MockEndorser {
        pub fn new(behaviours: Vec<PeerBehaviour>) -> Self {
            Self {
                behaviours,
                drop_last: false,
                calls: AtomicUsize::new(0),
            }
        }

        /// Answer one response short.
        pub fn short(mut self) -> Self {
            self.drop_last = true;
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn respond(&self, targets: &[PeerName], proposal: &SignedProposal) -> Vec<ProposalResponse> {
            let mut responses: Vec<_> = targets
                .iter()
                .enumerate()
                .map(|(i, peer)| {
                    match self.behaviours.get(i).cloned().unwrap_or(PeerBehaviour::Endorse) {
                        PeerBehaviour::Endorse => {
                            ProposalResponse::endorsed(peer.clone(), endorse_for(proposal, b"v"))
                        }
                        PeerBehaviour::Diverge => ProposalResponse::endorsed(
                            peer.clone(),
                            endorse_for(proposal, b"divergent"),
                        ),
                        PeerBehaviour::Fail(message) => {
                            ProposalResponse::failed(peer.clone(), 500, message)
                        }
                    }
                })
                .collect();
            if self.drop_last {
                responses.pop();
            }
            responses
        }
    }

    #[async_trait]
    impl EndorsementTransport for MockEndorser {
        async fn send_proposal(
            &self,
            targets: &[PeerName],
            proposal: &SignedProposal,
        ) -> Result<Vec<ProposalResponse>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.respond(targets, proposal))
        }
    }

    /// Orderer that records every envelope it is handed.
    pub struct RecordingOrderer {
        pub envelopes: Mutex<Vec<TransactionEnvelope>>,
        ack: BroadcastAck,
    }

    impl RecordingOrderer {
        pub fn new() -> Self {
            Self::with_ack(BroadcastAck::success())
        }

        pub fn with_ack(ack: BroadcastAck) -> Self {
            Self {
                envelopes: Mutex::new(Vec::new()),
                ack,
            }
        }

        pub fn broadcasts(&self) -> usize {
            self.envelopes.lock().len()
        }
    }

    #[async_trait]
    impl OrderingService for RecordingOrderer {
        async fn broadcast(&self, envelope: &TransactionEnvelope) -> Result<BroadcastAck, TransportError> {
            self.envelopes.lock().push(envelope.clone());
            Ok(self.ack.clone())
        }
    }

    /// Notifier that answers every registration with a fixed code, or never.
    pub struct FixedNotifier {
        code: Option<ValidationCode>,
        pending: Mutex<HashMap<TransactionId, oneshot::Sender<CommitStatus>>>,
        pub cancelled: Mutex<Vec<TransactionId>>,
    }

    impl FixedNotifier {
        pub fn committing(code: ValidationCode) -> Self {
            Self {
                code: Some(code),
                pending: Mutex::new(HashMap::new()),
                cancelled: Mutex::new(Vec::new()),
            }
        }

        pub fn silent() -> Self {
            Self {
                code: None,
                pending: Mutex::new(HashMap::new()),
                cancelled: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CommitNotifier for FixedNotifier {
        async fn register(
            &self,
            tx_id: &TransactionId,
        ) -> Result<oneshot::Receiver<CommitStatus>, TransportError> {
            let (tx, rx) = oneshot::channel();
            match self.code {
                Some(code) => {
                    let _ = tx.send(CommitStatus {
                        tx_id: tx_id.clone(),
                        block_number: 1,
                        validation_code: code,
                    });
                }
                None => {
                    self.pending.lock().insert(tx_id.clone(), tx);
                }
            }
            Ok(rx)
        }

        fn cancel(&self, tx_id: &TransactionId) {
            self.pending.lock().remove(tx_id);
            self.cancelled.lock().push(tx_id.clone());
        }
    }
}
