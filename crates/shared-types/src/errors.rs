//! # Error Types
//!
//! Errors raised while building, signing or checking shared entities.

use thiserror::Error;

/// Canonical encoding failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Canonical encoding failed: {0}")]
    Bincode(String),
}

/// Identity and signature errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Public key bytes are not a valid Ed25519 point.
    #[error("Invalid public key for MSP {msp_id}")]
    InvalidPublicKey { msp_id: String },

    /// Secret key material has the wrong length or encoding.
    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    /// Signature does not verify against the signer's public key.
    #[error("Signature verification failed for MSP {msp_id}")]
    SignatureMismatch { msp_id: String },

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Transaction id parsing errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("Invalid transaction id '{0}': expected 64 lowercase hex characters")]
    InvalidTransactionId(String),
}

/// Errors assembling a transaction envelope from proposal responses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// An envelope needs at least one endorsement.
    #[error("No endorsements to package")]
    NoEndorsements,

    /// Endorsers returned different read/write sets or results.
    #[error("Endorsement at index {index} does not match the first endorsement")]
    PayloadMismatch { index: usize },

    /// An endorsement was produced for a different proposal.
    #[error("Endorsement at index {index} references a different proposal")]
    ProposalHashMismatch { index: usize },

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}
