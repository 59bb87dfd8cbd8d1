//! `oemctl identity`: generate and list wallet identities.

use crate::cli::IdentityCommand;
use crate::config::RuntimeConfig;
use fc_01_identity::{FileSystemWallet, Wallet, WalletIdentity};
use shared_types::SigningIdentity;
use std::path::PathBuf;
use tracing::debug;

/// The wallet commands act on: the profile's credential store when the
/// profile loads, else the configured or default directory.
pub fn wallet(config: &RuntimeConfig) -> FileSystemWallet {
    match config.bootstrap.load_profile() {
        Ok(profile) => config.bootstrap.wallet(&profile),
        Err(e) => {
            debug!(error = %e, "Profile unavailable, using configured wallet path");
            FileSystemWallet::new(config.bootstrap.resolve_wallet_path(None))
        }
    }
}

/// Store a fresh key pair under `label`. Returns the written file.
pub async fn generate(
    wallet: &FileSystemWallet,
    label: &str,
    msp_id: &str,
) -> anyhow::Result<PathBuf> {
    let identity = SigningIdentity::generate(msp_id);
    Ok(wallet
        .import(&WalletIdentity::from_signing_identity(label, &identity))
        .await?)
}

pub async fn run(command: IdentityCommand, config: &RuntimeConfig) -> anyhow::Result<()> {
    let wallet = wallet(config);
    match command {
        IdentityCommand::Generate { label, msp_id } => {
            let path = generate(&wallet, &label, &msp_id).await?;
            println!("{label} ({msp_id}) written to {}", path.display());
        }
        IdentityCommand::List => {
            for label in wallet.list().await? {
                println!("{label}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_01_identity::{ClientContext, ConnectionProfile};

    #[tokio::test]
    async fn test_generated_identity_bootstraps() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = FileSystemWallet::new(dir.path());
        generate(&wallet, "Admin@requirements.oem.com", "RequirementsMSP")
            .await
            .unwrap();
        generate(&wallet, "User1", "RequirementsMSP").await.unwrap();

        assert_eq!(
            wallet.list().await.unwrap(),
            vec!["Admin@requirements.oem.com".to_string(), "User1".to_string()]
        );
        let profile = ConnectionProfile::from_yaml_str(crate::commands::fixtures::PROFILE).unwrap();
        let client = ClientContext::bootstrap(profile, "User1", &wallet).await.unwrap();
        assert_eq!(client.msp_id().as_str(), "RequirementsMSP");
    }

    #[tokio::test]
    async fn test_bad_label_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = FileSystemWallet::new(dir.path());
        let err = generate(&wallet, "../escape", "RequirementsMSP").await.unwrap_err();
        assert_eq!(crate::exit::exit_code(&err), 2);
    }

    #[test]
    fn test_missing_profile_falls_back_to_configured_path() {
        let mut config = RuntimeConfig::default();
        config.bootstrap.connection_profile = PathBuf::from("/nonexistent/profile.yaml");
        config.bootstrap.wallet_path = Some(PathBuf::from("/tmp/oem-wallet"));
        assert_eq!(wallet(&config).dir(), std::path::Path::new("/tmp/oem-wallet"));
    }
}
