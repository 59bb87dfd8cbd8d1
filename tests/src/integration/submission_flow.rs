//! # Submission Flow
//!
//! The two-phase protocol against a development network:
//!
//! ```text
//! propose ──→ peers (in target order) ──→ policy gate ──→ order ──→ block
//! ```
//!
//! Covers id uniqueness, response ordering, the policy gate, the bulk share
//! sample and the bounded commit wait.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use fc_02_submission::{
        CommitWait, EndorsementPolicy, SubmitError, TransactionSubmissionApi,
    };
    use fc_03_event_hub::{ChannelEventHub, CommitTracker, ConnectOptions, EventSource};
    use fc_devnet::{DevnetConfig, PeerBehaviour};
    use proptest::prelude::*;
    use shared_types::payloads::{Requirement, RequirementStatus};
    use shared_types::{SigningIdentity, TransactionId, ValidationCode};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    // =========================================================================
    // TRANSACTION IDS
    // =========================================================================

    proptest! {
        #[test]
        fn prop_generated_tx_ids_are_distinct(count in 2usize..200) {
            let creator = SigningIdentity::generate("RequirementsMSP");
            let creator = creator.creator().to_bytes().unwrap();
            let ids: HashSet<TransactionId> = (0..count)
                .map(|_| TransactionId::generate(&creator).0)
                .collect();
            prop_assert_eq!(ids.len(), count);
        }
    }

    #[tokio::test]
    async fn test_each_proposal_gets_a_fresh_id() {
        let net = TestNetwork::start().await;
        let submitter = net.submitter();
        let mut ids = HashSet::new();
        for _ in 0..20 {
            let tx = submitter
                .propose(
                    peers(&[REQUIREMENTS_PEER]),
                    invocation("GetAsset", &["Req-1"]),
                    &EndorsementPolicy::AtLeast(1),
                )
                .await;
            // Every GetAsset fails; the error still carries the id.
            let id = tx.err().and_then(|e| e.tx_id().cloned()).unwrap();
            assert!(ids.insert(id));
        }
    }

    // =========================================================================
    // PROPOSAL PHASE
    // =========================================================================

    #[tokio::test]
    async fn test_n_targets_give_n_responses_in_order() {
        let net = TestNetwork::start().await;
        let targets = peers(&[DESIGN_PEER, "peer9.oem.nowhere.com", REQUIREMENTS_PEER]);

        let endorsed = net
            .submitter()
            .propose(
                targets.clone(),
                invocation("NewAsset", &["Req-1", JOHN_DOE, "text"]),
                &EndorsementPolicy::AtLeast(1),
            )
            .await
            .unwrap();

        let responders: Vec<_> = endorsed
            .endorsements()
            .responses()
            .iter()
            .map(|r| r.peer.clone())
            .collect();
        assert_eq!(responders, targets);
        assert_eq!(endorsed.endorsements().endorsed_count(), 2);
        assert_eq!(endorsed.endorsements().failures()[0].peer, targets[1]);
    }

    #[tokio::test]
    async fn test_zero_endorsements_refuse_ordering() {
        let net = TestNetwork::start().await;
        for peer in [REQUIREMENTS_PEER, DESIGN_PEER] {
            net.network
                .set_behaviour(peer, PeerBehaviour::Rejecting("not today".into()));
        }

        let err = net
            .submitter()
            .propose(
                peers(&[REQUIREMENTS_PEER, DESIGN_PEER]),
                invocation("NewAsset", &["Req-1", JOHN_DOE, "text"]),
                &EndorsementPolicy::AtLeast(1),
            )
            .await
            .unwrap_err();

        match err {
            SubmitError::Endorsement {
                endorsed, failures, ..
            } => {
                assert_eq!(endorsed, 0);
                assert_eq!(failures.len(), 2);
            }
            other => panic!("expected endorsement failure, got {other}"),
        }
        assert!(net.orderer.sent().is_empty());
        assert_eq!(net.blocks_cut(), 0);
    }

    #[tokio::test]
    async fn test_repeated_target_counts_as_one_endorser() {
        let net = TestNetwork::start().await;

        let err = net
            .submitter()
            .propose(
                peers(&[REQUIREMENTS_PEER, REQUIREMENTS_PEER]),
                invocation("NewAsset", &["Req-1", JOHN_DOE, "text"]),
                &EndorsementPolicy::AtLeast(2),
            )
            .await
            .unwrap_err();

        match err {
            SubmitError::Endorsement {
                endorsed, required, ..
            } => {
                assert_eq!(endorsed, 1);
                assert_eq!(required, 2);
            }
            other => panic!("expected endorsement failure, got {other}"),
        }
        assert!(net.orderer.sent().is_empty());
        assert_eq!(net.blocks_cut(), 0);
    }

    #[tokio::test]
    async fn test_all_policy_fails_on_one_rejection() {
        let net = TestNetwork::start().await;
        net.network
            .set_behaviour(DESIGN_PEER, PeerBehaviour::Rejecting("busy".into()));

        let err = net
            .submitter()
            .propose(
                peers(&[REQUIREMENTS_PEER, DESIGN_PEER]),
                invocation("NewAsset", &["Req-1", JOHN_DOE, "text"]),
                &EndorsementPolicy::All,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind().exit_code(), 5);
    }

    // =========================================================================
    // ORDERING PHASE
    // =========================================================================

    #[tokio::test]
    async fn test_ordering_carries_the_proposal_tx_id() {
        let net = TestNetwork::start().await;
        let submitter = net.submitter();

        let endorsed = submitter
            .propose(
                peers(&[REQUIREMENTS_PEER, DESIGN_PEER]),
                invocation("NewAsset", &["Req-1", JOHN_DOE, "text"]),
                &EndorsementPolicy::All,
            )
            .await
            .unwrap();
        let proposed = endorsed.tx_id().clone();

        let outcome = submitter.order(endorsed, CommitWait::Skip).await.unwrap();
        assert_eq!(outcome.tx_id, proposed);
        assert_eq!(net.orderer.sent(), vec![proposed.clone()]);

        let block = net.network.ledger().block(0).unwrap();
        let committed = block.find(&proposed).unwrap();
        assert_eq!(committed.validation_code, ValidationCode::Valid);
    }

    #[tokio::test]
    async fn test_divergent_endorsements_are_not_ordered() {
        let net = TestNetwork::start().await;
        net.network.set_behaviour(DESIGN_PEER, PeerBehaviour::Divergent);

        let err = net
            .submitter()
            .propose(
                peers(&[REQUIREMENTS_PEER, DESIGN_PEER]),
                invocation("NewAsset", &["Req-1", JOHN_DOE, "text"]),
                &EndorsementPolicy::All,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::EndorsementMismatch { .. }));
        assert!(net.orderer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_share_assets_bulk_sample_is_one_transaction() {
        let net = TestNetwork::with_config(DevnetConfig::default()).await;
        let ids: Vec<String> = (4504..=9504).map(|n| format!("Req-1{n}")).collect();
        net.seed_assets(&ids);
        let height = net.network.ledger().height();

        let bulk = serde_json::to_string(&ids).unwrap();

        let outcome = net
            .submitter()
            .submit_transaction(
                peers(&[REQUIREMENTS_PEER]),
                invocation("ShareAssetsBulk", &[bulk.as_str(), SAM_DESIGNER]),
                Default::default(),
            )
            .await
            .unwrap();

        assert_eq!(net.orderer.sent(), vec![outcome.tx_id.clone()]);
        assert_eq!(net.blocks_cut(), 1);
        assert_eq!(net.network.ledger().height(), height + 1);

        let block = net.network.ledger().block(height).unwrap();
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(block.transactions[0].validation_code, ValidationCode::Valid);

        for id in [&ids[0], &ids[ids.len() - 1]] {
            let stored = net.network.ledger().get(id).unwrap();
            let requirement: Requirement = serde_json::from_slice(&stored.value).unwrap();
            assert_eq!(requirement.status, RequirementStatus::Shared);
            assert_eq!(requirement.owner.first_name, "Sam");
        }
    }

    // =========================================================================
    // COMMIT WAIT
    // =========================================================================

    #[tokio::test]
    async fn test_commit_wait_reports_block() {
        let net = TestNetwork::start().await;
        let source: Arc<dyn EventSource> = net.network.peer(REQUIREMENTS_PEER).unwrap().clone();
        let hub = Arc::new(ChannelEventHub::new(source));
        let tracker = CommitTracker::attach(Arc::clone(&hub));
        hub.connect(ConnectOptions::default()).await.unwrap();
        let submitter = net.submitter().with_commit_notifier(tracker);

        let endorsed = submitter
            .propose(
                peers(&[REQUIREMENTS_PEER]),
                invocation("NewAsset", &["Req-1", JOHN_DOE, "text"]),
                &EndorsementPolicy::AtLeast(1),
            )
            .await
            .unwrap();
        let outcome = submitter
            .order(endorsed, CommitWait::Wait { timeout: Duration::from_secs(2) })
            .await
            .unwrap();
        let commit = outcome.commit.unwrap();
        assert_eq!(commit.block_number, 0);
        assert_eq!(commit.tx_id, outcome.tx_id);
        hub.disconnect().await;
    }

    #[tokio::test]
    async fn test_commit_wait_times_out_instead_of_hanging() {
        let net = TestNetwork::start().await;
        // Watch a peer of another network: the commit is never seen.
        let elsewhere = TestNetwork::start().await;
        let source: Arc<dyn EventSource> =
            elsewhere.network.peer(REQUIREMENTS_PEER).unwrap().clone();
        let hub = Arc::new(ChannelEventHub::new(source));
        let tracker = CommitTracker::attach(Arc::clone(&hub));
        hub.connect(ConnectOptions::default()).await.unwrap();
        let submitter = net.submitter().with_commit_notifier(tracker.clone());

        let endorsed = submitter
            .propose(
                peers(&[REQUIREMENTS_PEER]),
                invocation("NewAsset", &["Req-1", JOHN_DOE, "text"]),
                &EndorsementPolicy::AtLeast(1),
            )
            .await
            .unwrap();
        let tx_id = endorsed.tx_id().clone();

        let started = std::time::Instant::now();
        let err = submitter
            .order(endorsed, CommitWait::Wait { timeout: Duration::from_millis(150) })
            .await
            .unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(err, SubmitError::CommitTimeout { timeout_ms: 150, .. }));
        assert_eq!(err.kind().exit_code(), 6);
        // Ordered even though the wait failed.
        assert_eq!(net.orderer.sent(), vec![tx_id.clone()]);
        assert!(!tracker.is_pending(&tx_id));
    }

    #[tokio::test]
    async fn test_commit_wait_without_notifier_is_refused() {
        let net = TestNetwork::start().await;
        let submitter = net.submitter();
        let endorsed = submitter
            .propose(
                peers(&[REQUIREMENTS_PEER]),
                invocation("NewAsset", &["Req-1", JOHN_DOE, "text"]),
                &EndorsementPolicy::AtLeast(1),
            )
            .await
            .unwrap();
        let err = submitter
            .order(endorsed, CommitWait::Wait { timeout: Duration::from_millis(100) })
            .await
            .unwrap_err();
        assert_eq!(err, SubmitError::NoCommitNotifier);
        assert!(net.orderer.sent().is_empty());
    }
}
