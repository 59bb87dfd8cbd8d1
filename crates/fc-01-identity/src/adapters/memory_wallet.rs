//! In-memory wallet, used by tests and the in-process demo network.

use crate::domain::errors::WalletError;
use crate::domain::wallet::WalletIdentity;
use crate::ports::outbound::Wallet;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::SigningIdentity;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct InMemoryWallet {
    identities: RwLock<BTreeMap<String, WalletIdentity>>,
}

impl InMemoryWallet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `identity` under `label`.
    pub fn put(&self, label: impl Into<String>, identity: &SigningIdentity) {
        let entry = WalletIdentity::from_signing_identity(label, identity);
        self.identities.write().insert(entry.label.clone(), entry);
    }

    /// Builder form of [`put`](Self::put).
    #[must_use]
    pub fn with(self, label: impl Into<String>, identity: &SigningIdentity) -> Self {
        self.put(label, identity);
        self
    }
}

#[async_trait]
impl Wallet for InMemoryWallet {
    async fn get(&self, label: &str) -> Result<Option<WalletIdentity>, WalletError> {
        Ok(self.identities.read().get(label).cloned())
    }

    async fn list(&self) -> Result<Vec<String>, WalletError> {
        Ok(self.identities.read().keys().cloned().collect())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}
