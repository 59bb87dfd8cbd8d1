//! Classification of per-peer proposal responses.

use crate::domain::errors::{PeerFailure, TransportError};
use shared_types::{Creator, EndorsedResponse, PeerName, ProposalOutcome, ProposalResponse};

/// Proposal responses of one attempt, in target order.
///
/// Partial failure is kept visible: endorsed and failed peers are both
/// reported, nothing is averaged away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndorsementSet {
    responses: Vec<ProposalResponse>,
}

impl EndorsementSet {
    /// Check that `responses` answer `targets` one-for-one and in order.
    pub fn classify(
        targets: &[PeerName],
        responses: Vec<ProposalResponse>,
    ) -> Result<Self, TransportError> {
        if responses.len() != targets.len() {
            return Err(TransportError::ResponseCountMismatch {
                expected: targets.len(),
                actual: responses.len(),
            });
        }
        for (position, (target, response)) in targets.iter().zip(&responses).enumerate() {
            if &response.peer != target {
                return Err(TransportError::UnexpectedResponder {
                    position,
                    expected: target.clone(),
                    actual: response.peer.clone(),
                });
            }
        }
        Ok(Self { responses })
    }

    #[must_use]
    pub fn responses(&self) -> &[ProposalResponse] {
        &self.responses
    }

    /// Endorsed responses with their peers, in target order.
    pub fn endorsed(&self) -> impl Iterator<Item = (&PeerName, &EndorsedResponse)> {
        self.responses
            .iter()
            .filter_map(|r| r.endorsement().map(|e| (&r.peer, e)))
    }

    #[must_use]
    pub fn endorsed_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_endorsed()).count()
    }

    /// Endorsed responses counted once per endorser identity. A peer named
    /// twice in the targets still contributes one endorsement.
    #[must_use]
    pub fn distinct_endorsers(&self) -> usize {
        let mut endorsers: Vec<&Creator> = Vec::new();
        for (_, response) in self.endorsed() {
            if !endorsers.contains(&&response.endorsement.endorser) {
                endorsers.push(&response.endorsement.endorser);
            }
        }
        endorsers.len()
    }

    #[must_use]
    pub fn target_count(&self) -> usize {
        self.responses.len()
    }

    #[must_use]
    pub fn failures(&self) -> Vec<PeerFailure> {
        self.responses
            .iter()
            .filter_map(|r| match &r.outcome {
                ProposalOutcome::Failed(f) => Some(PeerFailure {
                    peer: r.peer.clone(),
                    status: f.status,
                    message: f.message.clone(),
                }),
                ProposalOutcome::Endorsed(_) => None,
            })
            .collect()
    }

    /// Endorsed responses only, for envelope assembly.
    #[must_use]
    pub fn endorsements(&self) -> Vec<EndorsedResponse> {
        self.endorsed().map(|(_, e)| e.clone()).collect()
    }
}
