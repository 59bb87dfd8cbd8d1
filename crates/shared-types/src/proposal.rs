//! # Proposals and Proposal Responses
//!
//! Phase one of the submission flow:
//!
//! ```text
//! TransactionProposalRequest ──to_proposal──→ Proposal ──sign──→ SignedProposal
//!                                                                     │
//!                                           one per target peer       ↓
//!                                      ProposalResponse { peer, Endorsed | Failed }
//! ```

use crate::codec::{encode, hash_of};
use crate::entities::{
    ChaincodeEvent, ChaincodeId, ChaincodeInvocation, ChaincodeResponse, ChannelId, Hash,
    PeerName, ReadWriteSet,
};
use crate::errors::{EncodingError, IdentityError};
use crate::identity::{Creator, Signature, SigningIdentity};
use crate::ids::{Nonce, TransactionId};
use serde::{Deserialize, Serialize};

// =============================================================================
// REQUEST
// =============================================================================

/// Everything needed to ask a set of peers to endorse one transaction attempt.
///
/// Immutable once constructed. The transaction id is generated at
/// construction time, so every request is a distinct attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionProposalRequest {
    targets: Vec<PeerName>,
    invocation: ChaincodeInvocation,
    channel_id: ChannelId,
    tx_id: TransactionId,
    nonce: Nonce,
    creator: Creator,
    timestamp_ms: i64,
}

impl TransactionProposalRequest {
    /// Build a request with a fresh transaction id for `creator`.
    pub fn new(
        channel_id: ChannelId,
        targets: Vec<PeerName>,
        invocation: ChaincodeInvocation,
        creator: &Creator,
    ) -> Result<Self, EncodingError> {
        let (tx_id, nonce) = TransactionId::generate(&creator.to_bytes()?);
        Ok(Self {
            targets,
            invocation,
            channel_id,
            tx_id,
            nonce,
            creator: creator.clone(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        })
    }

    pub fn targets(&self) -> &[PeerName] {
        &self.targets
    }

    pub fn chaincode_id(&self) -> &ChaincodeId {
        &self.invocation.chaincode_id
    }

    pub fn function(&self) -> &str {
        &self.invocation.function
    }

    pub fn args(&self) -> &[Vec<u8>] {
        &self.invocation.args
    }

    pub fn invocation(&self) -> &ChaincodeInvocation {
        &self.invocation
    }

    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    pub fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    /// The proposal this request describes.
    pub fn to_proposal(&self) -> Proposal {
        Proposal {
            header: ProposalHeader {
                channel_id: self.channel_id.clone(),
                tx_id: self.tx_id.clone(),
                nonce: self.nonce,
                creator: self.creator.clone(),
                timestamp_ms: self.timestamp_ms,
            },
            invocation: self.invocation.clone(),
        }
    }
}

// =============================================================================
// PROPOSAL
// =============================================================================

/// Channel header and signature header of a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalHeader {
    pub channel_id: ChannelId,
    pub tx_id: TransactionId,
    pub nonce: Nonce,
    pub creator: Creator,
    pub timestamp_ms: i64,
}

/// The unsigned proposal sent to endorsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub header: ProposalHeader,
    pub invocation: ChaincodeInvocation,
}

impl Proposal {
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        encode(self)
    }

    /// Hash every endorsement must reference.
    pub fn hash(&self) -> Result<Hash, EncodingError> {
        hash_of(self)
    }

    /// True when the header's tx id matches its nonce and creator.
    pub fn tx_id_is_bound(&self) -> Result<bool, EncodingError> {
        let expected =
            TransactionId::compute(&self.header.nonce, &self.header.creator.to_bytes()?);
        Ok(expected == self.header.tx_id)
    }
}

/// A proposal signed by the submitting client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedProposal {
    pub proposal: Proposal,
    pub signature: Signature,
}

impl SignedProposal {
    pub fn sign(proposal: Proposal, identity: &SigningIdentity) -> Result<Self, EncodingError> {
        let signature = identity.sign(&proposal.to_bytes()?);
        Ok(Self {
            proposal,
            signature,
        })
    }

    /// Check the client signature against the creator in the header.
    pub fn verify(&self) -> Result<(), IdentityError> {
        let bytes = self.proposal.to_bytes()?;
        self.proposal.header.creator.verify(&bytes, &self.signature)
    }

    pub fn tx_id(&self) -> &TransactionId {
        &self.proposal.header.tx_id
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// What an endorser signs: the simulation result for one proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalResponsePayload {
    pub proposal_hash: Hash,
    pub results: ReadWriteSet,
    pub response: ChaincodeResponse,
    pub event: Option<ChaincodeEvent>,
}

impl ProposalResponsePayload {
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        encode(self)
    }
}

/// A peer's signature over a response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement {
    pub endorser: Creator,
    pub signature: Signature,
}

/// A successful proposal response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorsedResponse {
    pub payload: ProposalResponsePayload,
    pub endorsement: Endorsement,
}

impl EndorsedResponse {
    /// Sign `payload` as `endorser`.
    pub fn endorse(
        payload: ProposalResponsePayload,
        endorser: &SigningIdentity,
    ) -> Result<Self, EncodingError> {
        let signature = endorser.sign(&payload.to_bytes()?);
        Ok(Self {
            payload,
            endorsement: Endorsement {
                endorser: endorser.creator().clone(),
                signature,
            },
        })
    }

    /// Verify the endorser's signature over the payload.
    pub fn verify(&self) -> Result<(), IdentityError> {
        let bytes = self.payload.to_bytes()?;
        self.endorsement
            .endorser
            .verify(&bytes, &self.endorsement.signature)
    }
}

/// Why a peer did not endorse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorsementFailure {
    pub status: i32,
    pub message: String,
}

impl EndorsementFailure {
    pub fn new(status: i32, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Discriminated per-peer result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalOutcome {
    Endorsed(EndorsedResponse),
    Failed(EndorsementFailure),
}

/// One target peer's answer to a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalResponse {
    pub peer: PeerName,
    pub outcome: ProposalOutcome,
}

impl ProposalResponse {
    pub fn endorsed(peer: PeerName, response: EndorsedResponse) -> Self {
        Self {
            peer,
            outcome: ProposalOutcome::Endorsed(response),
        }
    }

    pub fn failed(peer: PeerName, status: i32, message: impl Into<String>) -> Self {
        Self {
            peer,
            outcome: ProposalOutcome::Failed(EndorsementFailure::new(status, message)),
        }
    }

    pub fn is_endorsed(&self) -> bool {
        matches!(self.outcome, ProposalOutcome::Endorsed(_))
    }

    pub fn endorsement(&self) -> Option<&EndorsedResponse> {
        match &self.outcome {
            ProposalOutcome::Endorsed(r) => Some(r),
            ProposalOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&EndorsementFailure> {
        match &self.outcome {
            ProposalOutcome::Endorsed(_) => None,
            ProposalOutcome::Failed(f) => Some(f),
        }
    }
}
