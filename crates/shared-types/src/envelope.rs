//! # Transaction Envelope
//!
//! Phase two of the submission flow: the signed proposal plus the endorsed
//! responses, keyed by the same transaction id, as broadcast to the
//! ordering service.
//!
//! ## Invariants
//!
//! - At least one endorsement.
//! - Every endorsement references the hash of the enclosed proposal.
//! - Every endorsement carries an identical response payload (same
//!   read/write set, same result, same event). Divergent endorsements would
//!   be rejected at validation time, so they are refused here.

use crate::codec::encode;
use crate::errors::{EncodingError, EnvelopeError};
use crate::identity::{Signature, SigningIdentity};
use crate::ids::TransactionId;
use crate::proposal::{EndorsedResponse, ProposalResponsePayload, SignedProposal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    tx_id: TransactionId,
    proposal: SignedProposal,
    responses: Vec<EndorsedResponse>,
    signature: Signature,
}

/// The portion of the envelope covered by the client signature.
#[derive(Serialize)]
struct SignedPart<'a> {
    tx_id: &'a TransactionId,
    proposal: &'a SignedProposal,
    responses: &'a [EndorsedResponse],
}

impl TransactionEnvelope {
    /// Package a signed proposal and its endorsements, checking consistency.
    pub fn assemble(
        proposal: SignedProposal,
        responses: Vec<EndorsedResponse>,
        identity: &SigningIdentity,
    ) -> Result<Self, EnvelopeError> {
        let first = responses.first().ok_or(EnvelopeError::NoEndorsements)?;
        let proposal_hash = proposal.proposal.hash()?;

        for (index, response) in responses.iter().enumerate() {
            if response.payload.proposal_hash != proposal_hash {
                return Err(EnvelopeError::ProposalHashMismatch { index });
            }
            if response.payload != first.payload {
                return Err(EnvelopeError::PayloadMismatch { index });
            }
        }

        let tx_id = proposal.tx_id().clone();
        let signature = identity.sign(&encode(&SignedPart {
            tx_id: &tx_id,
            proposal: &proposal,
            responses: &responses,
        })?);

        Ok(Self {
            tx_id,
            proposal,
            responses,
            signature,
        })
    }

    pub fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    pub fn proposal(&self) -> &SignedProposal {
        &self.proposal
    }

    pub fn responses(&self) -> &[EndorsedResponse] {
        &self.responses
    }

    /// The agreed response payload.
    pub fn payload(&self) -> &ProposalResponsePayload {
        // assemble() guarantees at least one response
        &self.responses[0].payload
    }

    pub fn endorsement_count(&self) -> usize {
        self.responses.len()
    }

    /// Verify the submitter's signature over the envelope.
    pub fn verify(&self) -> Result<(), EnvelopeError> {
        let bytes = self.signed_bytes()?;
        self.proposal
            .proposal
            .header
            .creator
            .verify(&bytes, &self.signature)?;
        Ok(())
    }

    fn signed_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        encode(&SignedPart {
            tx_id: &self.tx_id,
            proposal: &self.proposal,
            responses: &self.responses,
        })
    }
}
