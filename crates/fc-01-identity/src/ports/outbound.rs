//! Outbound Ports (Driven Ports / SPI)

use crate::domain::errors::WalletError;
use crate::domain::wallet::WalletIdentity;
use async_trait::async_trait;

/// Read-only credential store keyed by identity label.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Look up an identity. `Ok(None)` when the label is absent.
    async fn get(&self, label: &str) -> Result<Option<WalletIdentity>, WalletError>;

    /// Labels of every stored identity, sorted.
    async fn list(&self) -> Result<Vec<String>, WalletError>;

    /// Human-readable location, for error messages.
    fn location(&self) -> String;
}
