//! # Runtime Flow
//!
//! The command layer end to end: profile and wallet on disk, configuration
//! resolved to the in-process network, then a session that invokes and
//! queries.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use client_runtime::cli::{CommitArgs, FunctionArgs, InvokeCommand, NewAssetArgs};
    use client_runtime::commands::{invoke, query, Session};
    use client_runtime::{NetworkMode, RuntimeConfig};
    use fc_01_identity::{FileSystemWallet, WalletIdentity};
    use fc_devnet::DevnetConfig;
    use shared_types::payloads::Requirement;
    use shared_types::SigningIdentity;
    use std::path::Path;

    fn write_config(dir: &Path) -> RuntimeConfig {
        let profile = dir.join("connection.yaml");
        std::fs::write(&profile, PROFILE).unwrap();

        let mut config = RuntimeConfig {
            network: NetworkMode::Devnet,
            devnet: DevnetConfig::for_testing(),
            ..RuntimeConfig::default()
        };
        config.bootstrap.connection_profile = profile;
        config.bootstrap.wallet_path = Some(dir.join("wallet"));
        config.bootstrap.identity = USER.to_string();
        config
    }

    async fn enroll(dir: &Path, label: &str) {
        let wallet = FileSystemWallet::new(dir.join("wallet"));
        let identity = SigningIdentity::generate("RequirementsMSP");
        wallet
            .import(&WalletIdentity::from_signing_identity(label, &identity))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_session_from_disk_invokes_and_queries() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path());
        enroll(dir.path(), USER).await;

        let session = Session::open(config).await.unwrap();
        let outcome = invoke::run(
            &session,
            InvokeCommand::NewAsset(NewAssetArgs {
                id: "Req-1".into(),
                first_name: "John".into(),
                last_name: "Doe".into(),
                text: Some("brake pedal travel".into()),
                data_file: None,
                commit: CommitArgs { wait: true },
            }),
        )
        .await
        .unwrap();
        assert_eq!(outcome.commit.map(|c| c.block_number), Some(0));

        let payload = query::run(
            &session,
            &FunctionArgs {
                function: "GetAsset".into(),
                args: vec!["Req-1".into()],
                commit: CommitArgs { wait: false },
            },
        )
        .await
        .unwrap();
        let requirement: Requirement = serde_json::from_slice(&payload).unwrap();
        assert_eq!(requirement.id, "Req-1");
    }

    #[tokio::test]
    async fn test_missing_identity_exits_with_identity_code() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path());
        enroll(dir.path(), "someone-else").await;

        let err = Session::open(config).await.err().unwrap();
        assert_eq!(client_runtime::exit::exit_code(&err), 3);
    }

    #[tokio::test]
    async fn test_missing_profile_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = write_config(dir.path());
        config.bootstrap.connection_profile = dir.path().join("absent.yaml");

        let err = Session::open(config).await.err().unwrap();
        assert_eq!(client_runtime::exit::exit_code(&err), 2);
    }
}
