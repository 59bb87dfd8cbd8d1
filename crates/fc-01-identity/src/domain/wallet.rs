//! Identities as stored in a wallet.

use serde::{Deserialize, Serialize};
use shared_types::{IdentityError, MspId, SigningIdentity};

/// Key type tag written into identity files.
pub const ED25519: &str = "ed25519";

/// One wallet entry: an MSP id and its key pair, hex-encoded.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletIdentity {
    pub label: String,
    pub msp_id: String,
    #[serde(rename = "type")]
    pub key_type: String,
    pub public_key: String,
    pub private_key: String,
}

impl WalletIdentity {
    /// Capture a signing identity under `label`.
    pub fn from_signing_identity(label: impl Into<String>, identity: &SigningIdentity) -> Self {
        Self {
            label: label.into(),
            msp_id: identity.msp_id().to_string(),
            key_type: ED25519.to_string(),
            public_key: hex::encode(identity.creator().public_key),
            private_key: identity.secret_hex(),
        }
    }

    /// Rebuild the signing identity, checking the stored public key.
    pub fn to_signing_identity(&self) -> Result<SigningIdentity, IdentityError> {
        if self.key_type != ED25519 {
            return Err(IdentityError::InvalidSecretKey(format!(
                "unsupported key type {}",
                self.key_type
            )));
        }
        let identity = SigningIdentity::from_secret_hex(MspId::new(self.msp_id.clone()), &self.private_key)?;
        if hex::encode(identity.creator().public_key) != self.public_key.to_lowercase() {
            return Err(IdentityError::InvalidPublicKey {
                msp_id: self.msp_id.clone(),
            });
        }
        Ok(identity)
    }
}

impl std::fmt::Debug for WalletIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletIdentity")
            .field("label", &self.label)
            .field("msp_id", &self.msp_id)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
