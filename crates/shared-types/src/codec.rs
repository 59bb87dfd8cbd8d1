//! Canonical encoding and hashing.
//!
//! Signatures and hashes are always computed over the bincode encoding of a
//! value, never over JSON, so field order and whitespace cannot change them.

use crate::entities::Hash;
use crate::errors::EncodingError;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Encode a value into its canonical byte form.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, EncodingError> {
    bincode::serialize(value).map_err(|e| EncodingError::Bincode(e.to_string()))
}

/// SHA-256 over raw bytes.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// SHA-256 over the canonical encoding of a value.
pub fn hash_of<T: Serialize>(value: &T) -> Result<Hash, EncodingError> {
    Ok(sha256(&encode(value)?))
}
