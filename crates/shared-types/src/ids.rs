//! Transaction ids and nonces.
//!
//! A transaction id is the lowercase hex SHA-256 of `nonce || creator`, where
//! the nonce is 24 fresh random bytes. Reusing an id across attempts is a
//! correctness bug: the ledger rejects the second one as a duplicate.

use crate::codec::sha256;
use crate::errors::IdError;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a proposal nonce in bytes.
pub const NONCE_LEN: usize = 24;

/// Random nonce bound into a transaction id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    pub fn random() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", hex::encode(self.0))
    }
}

/// Unique id of one transaction attempt.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Derive the id for a nonce and a serialized creator.
    pub fn compute(nonce: &Nonce, creator: &[u8]) -> Self {
        let mut preimage = Vec::with_capacity(NONCE_LEN + creator.len());
        preimage.extend_from_slice(nonce.as_bytes());
        preimage.extend_from_slice(creator);
        Self(hex::encode(sha256(&preimage)))
    }

    /// Generate a fresh nonce and the id derived from it.
    pub fn generate(creator: &[u8]) -> (Self, Nonce) {
        let nonce = Nonce::random();
        (Self::compute(&nonce, creator), nonce)
    }

    /// Parse an id received from a peer, orderer or the command line.
    pub fn parse(value: &str) -> Result<Self, IdError> {
        let well_formed = value.len() == 64
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(IdError::InvalidTransactionId(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.short())
    }
}
