//! # FC-02: Transaction Submission
//!
//! The two-phase write path of a permissioned ledger client.
//!
//! ## Flow
//!
//! ```text
//! invocation ──→ [propose] ──→ peers simulate + sign ──→ policy gate
//!                                                          │
//!                              ┌───────────────────────────┘
//!                              ↓
//!               envelope (same tx id) ──→ [order] ──→ ordering service ack
//!                                                          │
//!                                            optional commit wait (bounded)
//! ```
//!
//! ## Guarantees
//!
//! - Every attempt gets a fresh transaction id; ids are never reused in-process.
//! - Nothing is ordered unless at least one peer endorsed and the policy holds.
//! - Endorsements must agree byte-for-byte before an envelope is built.
//! - A failed attempt reports its [`FailureKind`]: endorsement (nothing was
//!   ordered) or submission.
//!
//! ## Architecture
//!
//! - **Domain**: `Transaction<S>` typestate, `EndorsementSet`, `EndorsementPolicy`, `TxIdRegistry`
//! - **Ports**: Inbound `TransactionSubmissionApi`; outbound `EndorsementTransport`,
//!   `OrderingService`, `CommitNotifier`
//! - **Application**: `TransactionSubmitter`

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::TransactionSubmitter;
pub use config::SubmissionConfig;
pub use domain::endorsement::EndorsementSet;
pub use domain::errors::{FailureKind, PeerFailure, Phase, SubmitError, TransportError};
pub use domain::policy::EndorsementPolicy;
pub use domain::registry::TxIdRegistry;
pub use domain::transaction::{Endorsed, Proposed, Submitted, Transaction};
pub use domain::value_objects::{
    BroadcastAck, BroadcastStatus, CommitStatus, CommitWait, SubmitOutcome,
};
pub use ports::inbound::{SubmitOptions, TransactionSubmissionApi};
pub use ports::outbound::{CommitNotifier, EndorsementTransport, OrderingService};
