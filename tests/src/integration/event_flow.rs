//! # Event Flow
//!
//! Registrations on a peer's event hub, before and after activation, fed
//! by transactions ordered on the same development network.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use fc_02_submission::{SubmitOptions, TransactionSubmissionApi};
    use fc_03_event_hub::{ChannelEvent, ChannelEventHub, ConnectOptions, EventHubError, EventSource};
    use shared_types::payloads::{decode_event, event_names, NewAssetPayload};
    use shared_types::ChaincodeId;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    fn hub(net: &TestNetwork) -> Arc<ChannelEventHub> {
        let source: Arc<dyn EventSource> = net.network.peer(REQUIREMENTS_PEER).unwrap().clone();
        Arc::new(ChannelEventHub::new(source))
    }

    async fn create(net: &TestNetwork, id: &str) {
        net.submitter()
            .submit_transaction(
                peers(&[REQUIREMENTS_PEER]),
                invocation("NewAsset", &[id, JOHN_DOE, "text"]),
                SubmitOptions::default(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_registration_without_activation_delivers_nothing() {
        let net = TestNetwork::start().await;
        let hub = hub(&net);
        let mut registration =
            hub.register_chaincode_event(&ChaincodeId::new(CHAINCODE), event_names::NEW_ASSET);

        create(&net, "Req-1").await;

        assert!(!hub.is_connected());
        assert!(registration.stream.try_recv().unwrap().is_none());
        assert!(
            timeout(Duration::from_millis(100), registration.stream.recv())
                .await
                .is_err(),
            "nothing may arrive before connect"
        );
    }

    #[tokio::test]
    async fn test_registration_and_activation_deliver_matching_event() {
        let net = TestNetwork::start().await;
        let hub = hub(&net);
        let mut registration =
            hub.register_chaincode_event(&ChaincodeId::new(CHAINCODE), event_names::NEW_ASSET);
        hub.connect(ConnectOptions::default()).await.unwrap();

        create(&net, "Req-1").await;

        let event = timeout(Duration::from_secs(2), registration.stream.recv())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        match event {
            ChannelEvent::Chaincode {
                block_number,
                event,
                source,
            } => {
                assert_eq!(block_number, 0);
                assert_eq!(source.as_str(), REQUIREMENTS_PEER);
                let payload: NewAssetPayload = decode_event(&event).unwrap();
                assert_eq!(payload.asset_id, "Req-1");
            }
            other => panic!("unexpected event {other:?}"),
        }
        hub.disconnect().await;
    }

    #[tokio::test]
    async fn test_replay_from_block_after_the_fact() {
        let net = TestNetwork::start().await;
        create(&net, "Req-1").await;
        create(&net, "Req-2").await;

        let hub = hub(&net);
        let mut blocks = hub.register_block_event();
        hub.connect(ConnectOptions::from_block(1)).await.unwrap();

        match timeout(Duration::from_secs(2), blocks.stream.recv()).await.unwrap() {
            Some(Ok(ChannelEvent::BlockCommitted { block, .. })) => assert_eq!(block.number, 1),
            other => panic!("unexpected {other:?}"),
        }
        hub.disconnect().await;
    }

    #[tokio::test]
    async fn test_filtered_blocks_strip_event_payloads() {
        let net = TestNetwork::start().await;
        let hub = hub(&net);
        let mut registration =
            hub.register_chaincode_event(&ChaincodeId::new(CHAINCODE), event_names::NEW_ASSET);
        hub.connect(ConnectOptions {
            full_block: false,
            start_block: None,
        })
        .await
        .unwrap();

        create(&net, "Req-1").await;
        match timeout(Duration::from_secs(2), registration.stream.recv()).await.unwrap() {
            Some(Ok(ChannelEvent::Chaincode { event, .. })) => {
                assert_eq!(event.event_name, event_names::NEW_ASSET);
                assert!(event.payload.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
        hub.disconnect().await;
    }

    #[tokio::test]
    async fn test_unregister_and_disconnect_end_streams() {
        let net = TestNetwork::start().await;
        let hub = hub(&net);
        let chaincode = ChaincodeId::new(CHAINCODE);
        let mut dropped = hub.register_chaincode_event(&chaincode, event_names::NEW_ASSET);
        let mut kept = hub.register_chaincode_event(&chaincode, event_names::NEW_ASSET);
        hub.connect(ConnectOptions::default()).await.unwrap();

        assert!(hub.unregister(&dropped.id));
        assert!(timeout(Duration::from_secs(1), dropped.stream.recv())
            .await
            .unwrap()
            .is_none());

        hub.disconnect().await;
        match timeout(Duration::from_secs(1), kept.stream.recv()).await.unwrap() {
            Some(Err(EventHubError::Disconnected { .. })) => {}
            other => panic!("expected disconnect, got {other:?}"),
        }
        assert!(timeout(Duration::from_secs(1), kept.stream.recv())
            .await
            .unwrap()
            .is_none());
    }
}
