//! # Shared Types Crate
//!
//! Domain entities shared by every crate of the chaincode client workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: proposal, response and envelope shapes are
//!   defined once here and reused by the submission flow, the event hub and
//!   every transport.
//! - **Canonical Encoding**: anything that gets signed or hashed goes through
//!   [`codec::encode`] so peers, orderers and the client agree on the bytes.
//! - **Immutable Requests**: a [`TransactionProposalRequest`] cannot be
//!   modified after construction; a new attempt needs a new request and
//!   therefore a new transaction id.

pub mod block;
pub mod codec;
pub mod entities;
pub mod envelope;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod payloads;
pub mod proposal;

pub use block::{Block, BlockTransaction, ValidationCode};
pub use entities::*;
pub use envelope::TransactionEnvelope;
pub use errors::*;
pub use identity::{Creator, Signature, SigningIdentity};
pub use ids::{Nonce, TransactionId};
pub use proposal::*;
