//! Inbound Ports (Driving Ports / API)

use crate::domain::errors::SubmitError;
use crate::domain::policy::EndorsementPolicy;
use crate::domain::transaction::{Endorsed, Transaction};
use crate::domain::value_objects::{CommitWait, SubmitOutcome};
use async_trait::async_trait;
use shared_types::{ChaincodeInvocation, PeerName};

/// Per-call overrides of the submitter's configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    pub policy: Option<EndorsementPolicy>,
    pub commit: Option<CommitWait>,
}

/// Transaction submission API.
#[async_trait]
pub trait TransactionSubmissionApi: Send + Sync {
    /// Proposal phase: build a request with a fresh id, send it to every
    /// target, and gate on `policy`.
    async fn propose(
        &self,
        targets: Vec<PeerName>,
        invocation: ChaincodeInvocation,
        policy: &EndorsementPolicy,
    ) -> Result<Transaction<Endorsed>, SubmitError>;

    /// Ordering phase: broadcast the endorsed transaction, optionally
    /// waiting for its commit.
    async fn order(
        &self,
        tx: Transaction<Endorsed>,
        commit: CommitWait,
    ) -> Result<SubmitOutcome, SubmitError>;

    /// Both phases.
    async fn submit_transaction(
        &self,
        targets: Vec<PeerName>,
        invocation: ChaincodeInvocation,
        options: SubmitOptions,
    ) -> Result<SubmitOutcome, SubmitError>;

    /// Query: propose to the first target only and return the chaincode
    /// response payload. Nothing is ordered.
    async fn evaluate_transaction(
        &self,
        targets: Vec<PeerName>,
        invocation: ChaincodeInvocation,
    ) -> Result<Vec<u8>, SubmitError>;
}
