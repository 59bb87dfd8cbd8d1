//! # Identities and Signatures
//!
//! A `Creator` is the public, serialized identity bound into every proposal
//! (MSP id + Ed25519 public key). A `SigningIdentity` adds the secret key and
//! is what a wallet hands to the client.

use crate::codec::encode;
use crate::entities::MspId;
use crate::errors::{EncodingError, IdentityError};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::fmt;

/// Ed25519 signature (64 bytes).
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde_as(as = "Bytes")] [u8; 64]);

impl Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.0[..8]))
    }
}

/// Public identity of a client or peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Creator {
    pub msp_id: MspId,
    pub public_key: [u8; 32],
}

impl Creator {
    /// Serialized identity bytes, as bound into transaction ids.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        encode(self)
    }

    /// Verify `signature` over `message`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), IdentityError> {
        let key = VerifyingKey::from_bytes(&self.public_key).map_err(|_| {
            IdentityError::InvalidPublicKey {
                msp_id: self.msp_id.to_string(),
            }
        })?;
        let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        key.verify(message, &sig)
            .map_err(|_| IdentityError::SignatureMismatch {
                msp_id: self.msp_id.to_string(),
            })
    }
}

/// A creator together with its signing key.
#[derive(Clone)]
pub struct SigningIdentity {
    creator: Creator,
    key: SigningKey,
}

impl SigningIdentity {
    /// Generate a fresh identity for `msp_id`.
    pub fn generate(msp_id: impl Into<MspId>) -> Self {
        let key = SigningKey::generate(&mut rand::rngs::OsRng);
        Self::from_key(msp_id.into(), key)
    }

    /// Rebuild an identity from its 32-byte secret seed.
    pub fn from_secret(msp_id: impl Into<MspId>, secret: [u8; 32]) -> Self {
        Self::from_key(msp_id.into(), SigningKey::from_bytes(&secret))
    }

    /// Rebuild an identity from a hex-encoded secret seed.
    pub fn from_secret_hex(msp_id: impl Into<MspId>, secret_hex: &str) -> Result<Self, IdentityError> {
        let bytes = hex::decode(secret_hex.trim())
            .map_err(|e| IdentityError::InvalidSecretKey(e.to_string()))?;
        let secret: [u8; 32] = bytes
            .try_into()
            .map_err(|_| IdentityError::InvalidSecretKey("expected 32 bytes".into()))?;
        Ok(Self::from_secret(msp_id, secret))
    }

    fn from_key(msp_id: MspId, key: SigningKey) -> Self {
        let creator = Creator {
            msp_id,
            public_key: key.verifying_key().to_bytes(),
        };
        Self { creator, key }
    }

    pub fn creator(&self) -> &Creator {
        &self.creator
    }

    pub fn msp_id(&self) -> &MspId {
        &self.creator.msp_id
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.key.sign(message).to_bytes())
    }

    /// Hex secret seed, for writing wallet files.
    pub fn secret_hex(&self) -> String {
        hex::encode(self.key.to_bytes())
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("msp_id", &self.creator.msp_id)
            .field("public_key", &hex::encode(self.creator.public_key))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let identity = SigningIdentity::generate("RequirementsMSP");
        let sig = identity.sign(b"proposal bytes");
        assert!(identity.creator().verify(b"proposal bytes", &sig).is_ok());
    }

    #[test]
    fn test_verify_rejects_other_message() {
        let identity = SigningIdentity::generate("RequirementsMSP");
        let sig = identity.sign(b"proposal bytes");
        let err = identity.creator().verify(b"tampered", &sig).unwrap_err();
        assert!(matches!(err, IdentityError::SignatureMismatch { .. }));
    }

    #[test]
    fn test_secret_hex_roundtrip_keeps_public_key() {
        let identity = SigningIdentity::generate("DesignGroupMSP");
        let restored =
            SigningIdentity::from_secret_hex("DesignGroupMSP", &identity.secret_hex()).unwrap();
        assert_eq!(identity.creator(), restored.creator());
    }

    #[test]
    fn test_from_secret_hex_rejects_short_key() {
        let err = SigningIdentity::from_secret_hex("X", "abcd").unwrap_err();
        assert!(matches!(err, IdentityError::InvalidSecretKey(_)));
    }

    #[test]
    fn test_debug_hides_secret() {
        let identity = SigningIdentity::generate("RequirementsMSP");
        let debug = format!("{identity:?}");
        assert!(!debug.contains(&identity.secret_hex()));
    }
}
