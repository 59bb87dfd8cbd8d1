//! # Type-State Transaction
//!
//! One submission attempt, with its phase encoded in the type. Transitions
//! consume `self`, so an attempt cannot be ordered twice and an unendorsed
//! proposal cannot reach the ordering service:
//!
//! ```text
//! [Proposed] ──endorse──→ [Endorsed] ──submitted──→ [Submitted]
//!      │                       │
//!      └── policy not met ─────┴── Err(SubmitError), nothing ordered
//! ```
//!
//! Every state keeps the original request and signed proposal, so the
//! envelope is always keyed by the transaction id used in the proposal phase.

use crate::domain::endorsement::EndorsementSet;
use crate::domain::errors::SubmitError;
use crate::domain::policy::EndorsementPolicy;
use crate::domain::value_objects::BroadcastAck;
use shared_types::{
    ChaincodeResponse, EnvelopeError, ProposalResponse, SignedProposal, SigningIdentity,
    TransactionEnvelope, TransactionId, TransactionProposalRequest,
};
use tracing::warn;

// =============================================================================
// STATE MARKERS
// =============================================================================

/// Marker: signed, not yet endorsed.
#[derive(Debug, Clone, Copy)]
pub struct Proposed;

/// State: the endorsement policy is satisfied.
#[derive(Debug, Clone)]
pub struct Endorsed {
    endorsements: EndorsementSet,
}

/// State: the ordering service queued the envelope.
#[derive(Debug, Clone)]
pub struct Submitted {
    endorsements: EndorsementSet,
    ack: BroadcastAck,
}

// =============================================================================
// TRANSACTION
// =============================================================================

#[derive(Debug, Clone)]
pub struct Transaction<S> {
    request: TransactionProposalRequest,
    signed: SignedProposal,
    state: S,
}

impl<S> Transaction<S> {
    #[must_use]
    pub fn tx_id(&self) -> &TransactionId {
        self.request.tx_id()
    }

    #[must_use]
    pub fn request(&self) -> &TransactionProposalRequest {
        &self.request
    }

    #[must_use]
    pub fn signed_proposal(&self) -> &SignedProposal {
        &self.signed
    }
}

impl Transaction<Proposed> {
    /// Sign a request. This is the only entry point.
    pub fn new(
        request: TransactionProposalRequest,
        identity: &SigningIdentity,
    ) -> Result<Self, SubmitError> {
        let signed = SignedProposal::sign(request.to_proposal(), identity)?;
        Ok(Self {
            request,
            signed,
            state: Proposed,
        })
    }

    /// Apply the proposal responses.
    ///
    /// Every endorsement must reference this proposal, carry a valid peer
    /// signature when `verify` is set, and agree with the others; the count of
    /// endorsements must satisfy `policy`.
    pub fn endorse(
        self,
        endorsements: EndorsementSet,
        policy: &EndorsementPolicy,
        verify: bool,
    ) -> Result<Transaction<Endorsed>, SubmitError> {
        let tx_id = self.tx_id().clone();

        for failure in endorsements.failures() {
            warn!(
                tx_id = %tx_id.short(),
                peer = %failure.peer,
                status = failure.status,
                message = %failure.message,
                "Peer did not endorse proposal"
            );
        }

        let endorsed = endorsements.distinct_endorsers();
        let targets = endorsements.target_count();
        if !policy.is_satisfied(endorsed, targets) {
            return Err(SubmitError::Endorsement {
                tx_id,
                endorsed,
                targets,
                required: policy.required(targets),
                failures: endorsements.failures(),
            });
        }

        let proposal_hash = self.signed.proposal.hash()?;
        let mut first = None;
        for (index, (peer, response)) in endorsements.endorsed().enumerate() {
            if response.payload.proposal_hash != proposal_hash {
                return Err(SubmitError::InvalidEndorsement {
                    tx_id,
                    peer: peer.clone(),
                    reason: "endorsement references a different proposal".into(),
                });
            }
            if verify {
                if let Err(e) = response.verify() {
                    return Err(SubmitError::InvalidEndorsement {
                        tx_id,
                        peer: peer.clone(),
                        reason: e.to_string(),
                    });
                }
            }
            match first {
                None => first = Some(&response.payload),
                Some(expected) if expected != &response.payload => {
                    return Err(SubmitError::EndorsementMismatch { tx_id, index });
                }
                Some(_) => {}
            }
        }

        Ok(Transaction {
            request: self.request,
            signed: self.signed,
            state: Endorsed { endorsements },
        })
    }
}

impl Transaction<Endorsed> {
    #[must_use]
    pub fn endorsements(&self) -> &EndorsementSet {
        &self.state.endorsements
    }

    /// The agreed chaincode response.
    pub fn response(&self) -> Option<&ChaincodeResponse> {
        self.state
            .endorsements
            .endorsed()
            .next()
            .map(|(_, e)| &e.payload.response)
    }

    /// The agreed chaincode response payload, empty if none.
    #[must_use]
    pub fn result(&self) -> &[u8] {
        self.response().map(|r| r.payload.as_slice()).unwrap_or_default()
    }

    /// Package the proposal and endorsements for the ordering service.
    pub fn envelope(&self, identity: &SigningIdentity) -> Result<TransactionEnvelope, SubmitError> {
        TransactionEnvelope::assemble(
            self.signed.clone(),
            self.state.endorsements.endorsements(),
            identity,
        )
        .map_err(|e| match e {
            EnvelopeError::PayloadMismatch { index } | EnvelopeError::ProposalHashMismatch { index } => {
                SubmitError::EndorsementMismatch {
                    tx_id: self.tx_id().clone(),
                    index,
                }
            }
            EnvelopeError::NoEndorsements => SubmitError::Endorsement {
                tx_id: self.tx_id().clone(),
                endorsed: 0,
                targets: self.state.endorsements.target_count(),
                required: 1,
                failures: self.state.endorsements.failures(),
            },
            EnvelopeError::Encoding(e) => SubmitError::Encoding(e),
            other => SubmitError::Envelope(other),
        })
    }

    /// Record the ordering service's acknowledgment.
    #[must_use = "The submitted transaction must be handled"]
    pub fn submitted(self, ack: BroadcastAck) -> Transaction<Submitted> {
        Transaction {
            request: self.request,
            signed: self.signed,
            state: Submitted {
                endorsements: self.state.endorsements,
                ack,
            },
        }
    }
}

impl Transaction<Submitted> {
    #[must_use]
    pub fn ack(&self) -> &BroadcastAck {
        &self.state.ack
    }

    #[must_use]
    pub fn endorsements(&self) -> &EndorsementSet {
        &self.state.endorsements
    }
}

/// Convenience for tests and transports: responses straight from a batch call.
pub fn classify_for(
    tx: &Transaction<Proposed>,
    responses: Vec<ProposalResponse>,
) -> Result<EndorsementSet, crate::domain::errors::TransportError> {
    EndorsementSet::classify(tx.request.targets(), responses)
}
