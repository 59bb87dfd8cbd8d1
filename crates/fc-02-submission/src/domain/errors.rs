//! Error types for transaction submission
//!
//! Setup failures live in `fc-01-identity::BootstrapError`. Everything here
//! happens after a proposal has been built, and falls into one of two kinds
//! reported by [`SubmitError::kind`].

use serde::{Deserialize, Serialize};
use shared_types::{EncodingError, EnvelopeError, PeerName, TransactionId, ValidationCode};
use thiserror::Error;

/// Failure talking to a peer or orderer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Endpoint {endpoint} unreachable: {reason}")]
    Unreachable { endpoint: String, reason: String },

    /// The batched proposal call did not answer once per target.
    #[error("Expected {expected} proposal responses, got {actual}")]
    ResponseCountMismatch { expected: usize, actual: usize },

    /// A response arrived out of target order.
    #[error("Response {position} came from {actual}, expected {expected}")]
    UnexpectedResponder {
        position: usize,
        expected: PeerName,
        actual: PeerName,
    },

    #[error("Protocol error from {endpoint}: {reason}")]
    Protocol { endpoint: String, reason: String },

    #[error("No event source connected for commit notifications")]
    NotConnected,
}

/// Phase of the flow a transport failure interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Proposal,
    Ordering,
    CommitWait,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Phase::Proposal => "proposal",
            Phase::Ordering => "ordering",
            Phase::CommitWait => "commit wait",
        })
    }
}

/// One peer that did not endorse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerFailure {
    pub peer: PeerName,
    pub status: i32,
    pub message: String,
}

impl std::fmt::Display for PeerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.peer, self.status, self.message)
    }
}

fn list_failures(failures: &[PeerFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Which side of the ordering boundary a failure happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Nothing was broadcast.
    Endorsement,
    /// The attempt reached (or was about to reach) the ordering service.
    Submission,
}

impl FailureKind {
    /// Process exit code for this kind.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            FailureKind::Endorsement => 5,
            FailureKind::Submission => 6,
        }
    }
}

/// All errors of one submission attempt. None are retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("No target peers for the proposal")]
    NoTargets,

    /// The endorsement policy was not met; nothing was ordered.
    #[error(
        "Transaction {tx_id} endorsed by {endorsed} of {targets} peers, {required} required: {}",
        list_failures(.failures)
    )]
    Endorsement {
        tx_id: TransactionId,
        endorsed: usize,
        targets: usize,
        required: usize,
        failures: Vec<PeerFailure>,
    },

    /// Endorsers disagree on the simulation result.
    #[error("Endorsements for {tx_id} do not match (response {index})")]
    EndorsementMismatch { tx_id: TransactionId, index: usize },

    /// An endorsement failed signature or proposal-hash checks.
    #[error("Invalid endorsement from {peer} for {tx_id}: {reason}")]
    InvalidEndorsement {
        tx_id: TransactionId,
        peer: PeerName,
        reason: String,
    },

    #[error("Transport failure during {phase}: {source}")]
    Transport {
        phase: Phase,
        #[source]
        source: TransportError,
    },

    /// The ordering service refused to queue the envelope.
    #[error("Ordering service rejected {tx_id}: {status} {info}")]
    Ordering {
        tx_id: TransactionId,
        status: String,
        info: String,
    },

    /// The transaction was committed but marked invalid.
    #[error("Transaction {tx_id} committed in block {block_number} as invalid: {code}")]
    Commit {
        tx_id: TransactionId,
        code: ValidationCode,
        block_number: u64,
    },

    #[error("Timed out after {timeout_ms}ms waiting for commit of {tx_id}")]
    CommitTimeout { tx_id: TransactionId, timeout_ms: u64 },

    /// The commit notifier went away before reporting.
    #[error("Commit notification for {tx_id} was abandoned")]
    CommitAborted { tx_id: TransactionId },

    #[error("Commit wait requested but no commit notifier is configured")]
    NoCommitNotifier,

    #[error("Transaction id {tx_id} was already used in this process")]
    DuplicateTransactionId { tx_id: TransactionId },

    #[error("Cannot assemble envelope: {0}")]
    Envelope(EnvelopeError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl SubmitError {
    /// Classify the failure.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoTargets
            | Self::Endorsement { .. }
            | Self::EndorsementMismatch { .. }
            | Self::InvalidEndorsement { .. } => FailureKind::Endorsement,
            Self::Transport { phase, .. } if *phase == Phase::Proposal => FailureKind::Endorsement,
            Self::Transport { .. }
            | Self::Ordering { .. }
            | Self::Commit { .. }
            | Self::CommitTimeout { .. }
            | Self::CommitAborted { .. }
            | Self::NoCommitNotifier
            | Self::DuplicateTransactionId { .. }
            | Self::Envelope(_)
            | Self::Encoding(_) => FailureKind::Submission,
        }
    }

    /// Transaction id of the failed attempt, when one was assigned.
    #[must_use]
    pub fn tx_id(&self) -> Option<&TransactionId> {
        match self {
            Self::Endorsement { tx_id, .. }
            | Self::EndorsementMismatch { tx_id, .. }
            | Self::InvalidEndorsement { tx_id, .. }
            | Self::Ordering { tx_id, .. }
            | Self::Commit { tx_id, .. }
            | Self::CommitTimeout { tx_id, .. }
            | Self::CommitAborted { tx_id }
            | Self::DuplicateTransactionId { tx_id } => Some(tx_id),
            Self::NoTargets
            | Self::Transport { .. }
            | Self::NoCommitNotifier
            | Self::Envelope(_)
            | Self::Encoding(_) => None,
        }
    }

    pub(crate) fn transport(phase: Phase) -> impl FnOnce(TransportError) -> Self {
        move |source| Self::Transport { phase, source }
    }
}
