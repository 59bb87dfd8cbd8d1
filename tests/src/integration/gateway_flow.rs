//! # Gateway Flow
//!
//! The high-level surface: one gateway per identity, networks per channel,
//! contracts per chaincode.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use fc_01_identity::{ConnectionProfile, InMemoryWallet};
    use fc_04_gateway::{CommitStrategy, Gateway, GatewayError, GatewayOptions};
    use fc_devnet::{DevNetwork, DevTransport, DevnetConfig};
    use shared_types::payloads::{decode_event, event_names, NewAssetPayload, Requirement};
    use shared_types::SigningIdentity;
    use std::sync::Arc;
    use std::time::Duration;

    async fn gateway(strategy: CommitStrategy) -> (Gateway, Arc<DevNetwork>) {
        let profile = ConnectionProfile::from_yaml_str(PROFILE).unwrap();
        let network = DevNetwork::from_profile(&profile, DevnetConfig::for_testing()).unwrap();
        let wallet = InMemoryWallet::new().with(USER, &SigningIdentity::generate("RequirementsMSP"));
        let options = GatewayOptions::new(
            USER,
            Arc::new(wallet),
            Arc::new(DevTransport(Arc::clone(&network))),
        )
        .with_commit_strategy(strategy);
        (Gateway::connect(profile, options).await.unwrap(), network)
    }

    #[tokio::test]
    async fn test_submit_waits_for_commit() {
        let (gateway, network) = gateway(CommitStrategy::AnyPeer { timeout_ms: 2_000 }).await;
        let contract = gateway.network(CHANNEL).await.unwrap().contract(CHAINCODE);

        let mut transaction = contract.create_transaction("NewAsset");
        assert!(transaction.transaction_id().is_none());
        transaction.submit(&["Req-1", JOHN_DOE, "text"]).await.unwrap();

        let tx_id = transaction.transaction_id().cloned().unwrap();
        let outcome = transaction.outcome().unwrap();
        assert_eq!(outcome.tx_id, tx_id);
        assert_eq!(outcome.commit.as_ref().map(|c| c.block_number), Some(0));
        assert_eq!(network.ledger().height(), 1);

        let payload = contract.evaluate_transaction("GetAsset", &["Req-1"]).await.unwrap();
        let requirement: Requirement = serde_json::from_slice(&payload).unwrap();
        assert_eq!(requirement.owner.first_name, "John");
        gateway.disconnect().await;
    }

    #[tokio::test]
    async fn test_transaction_is_single_use() {
        let (gateway, _network) = gateway(CommitStrategy::None).await;
        let contract = gateway.network(CHANNEL).await.unwrap().contract(CHAINCODE);

        let mut transaction = contract.create_transaction("NewAsset");
        transaction.submit(&["Req-1", JOHN_DOE, "text"]).await.unwrap();
        let err = transaction
            .submit(&["Req-2", JOHN_DOE, "text"])
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::AlreadySubmitted { .. }));
        assert_eq!(err.exit_code(), 6);
        gateway.disconnect().await;
    }

    #[tokio::test]
    async fn test_contract_listener_receives_event() {
        let (gateway, _network) = gateway(CommitStrategy::AnyPeer { timeout_ms: 2_000 }).await;
        let contract = gateway.network(CHANNEL).await.unwrap().contract(CHAINCODE);
        let mut listener = contract
            .add_contract_listener(event_names::NEW_ASSET)
            .await
            .unwrap();

        contract
            .submit_transaction("NewAsset", &["Req-7", JOHN_DOE, "text"])
            .await
            .unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), listener.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(event.block_number, 0);
        let payload: NewAssetPayload = decode_event(&event.event).unwrap();
        assert_eq!(payload.asset_id, "Req-7");
        assert!(listener.remove());
        gateway.disconnect().await;
    }

    #[tokio::test]
    async fn test_failed_endorsement_keeps_tx_id() {
        let (gateway, network) = gateway(CommitStrategy::None).await;
        let contract = gateway.network(CHANNEL).await.unwrap().contract(CHAINCODE);

        let mut transaction = contract.create_transaction("GetAsset");
        let err = transaction.submit(&["Req-404"]).await.unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert!(transaction.transaction_id().is_some());
        assert_eq!(network.ledger().height(), 0);
        gateway.disconnect().await;
    }
}
