//! Committed blocks as delivered by a peer's deliver service.

use crate::codec::{hash_of, sha256};
use crate::entities::{ChaincodeEvent, Hash};
use crate::errors::EncodingError;
use crate::ids::TransactionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation result the committing peers assigned to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    Valid,
    MvccReadConflict,
    EndorsementPolicyFailure,
    #[serde(rename = "DUPLICATE_TXID")]
    DuplicateTxId,
    BadPayload,
}

impl ValidationCode {
    pub fn is_valid(self) -> bool {
        self == ValidationCode::Valid
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValidationCode::Valid => "VALID",
            ValidationCode::MvccReadConflict => "MVCC_READ_CONFLICT",
            ValidationCode::EndorsementPolicyFailure => "ENDORSEMENT_POLICY_FAILURE",
            ValidationCode::DuplicateTxId => "DUPLICATE_TXID",
            ValidationCode::BadPayload => "BAD_PAYLOAD",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transaction inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTransaction {
    pub tx_id: TransactionId,
    pub validation_code: ValidationCode,
    pub chaincode_event: Option<ChaincodeEvent>,
}

/// A committed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub number: u64,
    pub previous_hash: Hash,
    pub data_hash: Hash,
    pub transactions: Vec<BlockTransaction>,
}

impl Block {
    /// Build a block, computing its data hash.
    pub fn new(
        number: u64,
        previous_hash: Hash,
        transactions: Vec<BlockTransaction>,
    ) -> Result<Self, EncodingError> {
        let data_hash = hash_of(&transactions)?;
        Ok(Self {
            number,
            previous_hash,
            data_hash,
            transactions,
        })
    }

    /// Hash of this block's header, used as the next block's `previous_hash`.
    pub fn header_hash(&self) -> Hash {
        let mut preimage = Vec::with_capacity(8 + 64);
        preimage.extend_from_slice(&self.number.to_be_bytes());
        preimage.extend_from_slice(&self.previous_hash);
        preimage.extend_from_slice(&self.data_hash);
        sha256(&preimage)
    }

    pub fn find(&self, tx_id: &TransactionId) -> Option<&BlockTransaction> {
        self.transactions.iter().find(|t| &t.tx_id == tx_id)
    }

    pub fn valid_count(&self) -> usize {
        self.transactions
            .iter()
            .filter(|t| t.validation_code.is_valid())
            .count()
    }
}
