//! Configuration for client bootstrap

use crate::adapters::FileSystemWallet;
use crate::domain::errors::ProfileError;
use crate::domain::profile::{ClientProfile, ConnectionProfile};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the client finds its profiles and credentials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Network connection profile (YAML or JSON).
    pub connection_profile: PathBuf,
    /// Optional per-organization client profile merged over the connection profile.
    pub client_profile: Option<PathBuf>,
    /// Wallet directory. When unset, the profile's credential store path is used.
    pub wallet_path: Option<PathBuf>,
    /// Wallet label of the identity to act as.
    pub identity: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            connection_profile: PathBuf::from("../profiles/aws-dev-connection.yaml"),
            client_profile: None,
            wallet_path: None,
            identity: "Admin@requirements.oem.com".to_string(),
        }
    }
}

impl BootstrapConfig {
    /// Wallet directory, falling back to the profile's credential store and
    /// then to `./user-wallet`.
    #[must_use]
    pub fn resolve_wallet_path(&self, profile_store: Option<&str>) -> PathBuf {
        self.wallet_path
            .clone()
            .or_else(|| profile_store.map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("./user-wallet"))
    }

    /// The connection profile with the client profile, if any, merged over it.
    pub fn load_profile(&self) -> Result<ConnectionProfile, ProfileError> {
        let mut profile = ConnectionProfile::load(&self.connection_profile)?;
        if let Some(path) = &self.client_profile {
            profile.merge_client(ClientProfile::load(path)?);
            profile.validate()?;
        }
        Ok(profile)
    }

    /// File system wallet for `profile`, following [`Self::resolve_wallet_path`].
    #[must_use]
    pub fn wallet(&self, profile: &ConnectionProfile) -> FileSystemWallet {
        let store = profile
            .client
            .credential_store
            .as_ref()
            .map(|s| s.path.as_str());
        FileSystemWallet::new(self.resolve_wallet_path(store))
    }
}
