//! # Transaction Submitter
//!
//! Drives one attempt through both phases:
//!
//! 1. **Proposal**: fresh id, signed proposal, one batched call to the
//!    target peers, policy gate.
//! 2. **Ordering**: envelope keyed by the same id, commit listener armed,
//!    broadcast, optional bounded wait for the commit event.
//!
//! Nothing is retried. A failed attempt surfaces its `SubmitError`; trying
//! again means a new proposal with a new id.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::config::SubmissionConfig;
use crate::domain::errors::{Phase, SubmitError};
use crate::domain::policy::EndorsementPolicy;
use crate::domain::registry::TxIdRegistry;
use crate::domain::transaction::{classify_for, Endorsed, Transaction};
use crate::domain::value_objects::{CommitStatus, CommitWait, SubmitOutcome};
use crate::ports::inbound::{SubmitOptions, TransactionSubmissionApi};
use crate::ports::outbound::{CommitNotifier, EndorsementTransport, OrderingService};
use fc_01_identity::ChannelContext;
use shared_types::{
    ChaincodeInvocation, ChannelId, PeerName, SigningIdentity, TransactionId,
    TransactionProposalRequest,
};

pub struct TransactionSubmitter {
    channel_id: ChannelId,
    identity: SigningIdentity,
    endorser: Arc<dyn EndorsementTransport>,
    orderer: Arc<dyn OrderingService>,
    notifier: Option<Arc<dyn CommitNotifier>>,
    config: SubmissionConfig,
    registry: TxIdRegistry,
}

impl TransactionSubmitter {
    pub fn new(
        channel_id: ChannelId,
        identity: SigningIdentity,
        endorser: Arc<dyn EndorsementTransport>,
        orderer: Arc<dyn OrderingService>,
    ) -> Self {
        Self {
            channel_id,
            identity,
            endorser,
            orderer,
            notifier: None,
            config: SubmissionConfig::default(),
            registry: TxIdRegistry::new(),
        }
    }

    /// Submitter acting for the channel's client identity.
    pub fn from_channel(
        channel: &ChannelContext,
        endorser: Arc<dyn EndorsementTransport>,
        orderer: Arc<dyn OrderingService>,
    ) -> Self {
        Self::new(
            channel.name().clone(),
            channel.identity().clone(),
            endorser,
            orderer,
        )
    }

    #[must_use]
    pub fn with_config(mut self, config: SubmissionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_commit_notifier(mut self, notifier: Arc<dyn CommitNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    #[must_use]
    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    fn cancel_commit_watch(&self, tx_id: &TransactionId) {
        if let Some(notifier) = &self.notifier {
            notifier.cancel(tx_id);
        }
    }

    async fn await_commit(
        &self,
        tx_id: &TransactionId,
        receiver: oneshot::Receiver<CommitStatus>,
        timeout: Duration,
    ) -> Result<CommitStatus, SubmitError> {
        match tokio::time::timeout(timeout, receiver).await {
            Err(_) => {
                self.cancel_commit_watch(tx_id);
                warn!(tx_id = %tx_id.short(), timeout_ms = timeout.as_millis() as u64, "Commit wait timed out");
                Err(SubmitError::CommitTimeout {
                    tx_id: tx_id.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Ok(Err(_)) => Err(SubmitError::CommitAborted {
                tx_id: tx_id.clone(),
            }),
            Ok(Ok(status)) if status.validation_code.is_valid() => {
                info!(
                    tx_id = %tx_id.short(),
                    block = status.block_number,
                    "Transaction committed"
                );
                Ok(status)
            }
            Ok(Ok(status)) => {
                warn!(
                    tx_id = %tx_id.short(),
                    block = status.block_number,
                    code = %status.validation_code,
                    "Transaction committed as invalid"
                );
                Err(SubmitError::Commit {
                    tx_id: tx_id.clone(),
                    code: status.validation_code,
                    block_number: status.block_number,
                })
            }
        }
    }
}

#[async_trait]
impl TransactionSubmissionApi for TransactionSubmitter {
    async fn propose(
        &self,
        targets: Vec<PeerName>,
        invocation: ChaincodeInvocation,
        policy: &EndorsementPolicy,
    ) -> Result<Transaction<Endorsed>, SubmitError> {
        if targets.is_empty() {
            return Err(SubmitError::NoTargets);
        }

        let request = TransactionProposalRequest::new(
            self.channel_id.clone(),
            targets,
            invocation,
            self.identity.creator(),
        )?;
        self.registry.claim(request.tx_id())?;
        let tx = Transaction::new(request, &self.identity)?;

        debug!(
            tx_id = %tx.tx_id().short(),
            function = tx.request().function(),
            targets = tx.request().targets().len(),
            "Sending proposal"
        );

        let responses = self
            .endorser
            .send_proposal(tx.request().targets(), tx.signed_proposal())
            .await
            .map_err(SubmitError::transport(Phase::Proposal))?;
        let endorsements =
            classify_for(&tx, responses).map_err(SubmitError::transport(Phase::Proposal))?;

        let endorsed = tx.endorse(endorsements, policy, self.config.verify_endorsements)?;
        info!(
            tx_id = %endorsed.tx_id().short(),
            endorsed = endorsed.endorsements().endorsed_count(),
            targets = endorsed.endorsements().target_count(),
            "Proposal endorsed"
        );
        Ok(endorsed)
    }

    async fn order(
        &self,
        tx: Transaction<Endorsed>,
        commit: CommitWait,
    ) -> Result<SubmitOutcome, SubmitError> {
        let tx_id = tx.tx_id().clone();
        let envelope = tx.envelope(&self.identity)?;

        // Armed before broadcast so a fast commit cannot be missed.
        let watch = match commit {
            CommitWait::Skip => None,
            CommitWait::Wait { timeout } => {
                let notifier = self.notifier.as_ref().ok_or(SubmitError::NoCommitNotifier)?;
                let receiver = notifier
                    .register(&tx_id)
                    .await
                    .map_err(SubmitError::transport(Phase::CommitWait))?;
                Some((receiver, timeout))
            }
        };

        let ack = match self.orderer.broadcast(&envelope).await {
            Ok(ack) => ack,
            Err(e) => {
                self.cancel_commit_watch(&tx_id);
                return Err(SubmitError::transport(Phase::Ordering)(e));
            }
        };
        if !ack.is_success() {
            self.cancel_commit_watch(&tx_id);
            warn!(tx_id = %tx_id.short(), status = ack.status.as_str(), info = %ack.info, "Broadcast rejected");
            return Err(SubmitError::Ordering {
                tx_id,
                status: ack.status.as_str().to_string(),
                info: ack.info,
            });
        }

        let result = tx.result().to_vec();
        let submitted = tx.submitted(ack);
        info!(tx_id = %tx_id.short(), "Transaction queued by ordering service");

        let commit = match watch {
            None => None,
            Some((receiver, timeout)) => Some(self.await_commit(&tx_id, receiver, timeout).await?),
        };

        Ok(SubmitOutcome {
            tx_id,
            result,
            endorsements: submitted.endorsements().endorsed_count(),
            failures: submitted.endorsements().failures(),
            ack: submitted.ack().clone(),
            commit,
        })
    }

    async fn submit_transaction(
        &self,
        targets: Vec<PeerName>,
        invocation: ChaincodeInvocation,
        options: SubmitOptions,
    ) -> Result<SubmitOutcome, SubmitError> {
        let policy = options.policy.unwrap_or(self.config.policy);
        let commit = options.commit.unwrap_or_else(|| self.config.commit_wait());
        let endorsed = self.propose(targets, invocation, &policy).await?;
        self.order(endorsed, commit).await
    }

    async fn evaluate_transaction(
        &self,
        targets: Vec<PeerName>,
        invocation: ChaincodeInvocation,
    ) -> Result<Vec<u8>, SubmitError> {
        let first = targets.into_iter().next().ok_or(SubmitError::NoTargets)?;
        let endorsed = self
            .propose(vec![first], invocation, &EndorsementPolicy::AtLeast(1))
            .await?;
        Ok(endorsed.result().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{FailureKind, TransportError};
    use crate::domain::value_objects::{BroadcastAck, BroadcastStatus};
    use crate::ports::outbound::mocks::{FixedNotifier, MockEndorser, PeerBehaviour, RecordingOrderer};
    use shared_types::ValidationCode;

    fn peers(names: &[&str]) -> Vec<PeerName> {
        names.iter().map(|n| PeerName::new(*n)).collect()
    }

    fn invocation() -> ChaincodeInvocation {
        ChaincodeInvocation::new("oemcc", "NewAsset").string_args(["REQ-1", "{}", "text"])
    }

    fn submitter(
        endorser: Arc<MockEndorser>,
        orderer: Arc<RecordingOrderer>,
    ) -> TransactionSubmitter {
        TransactionSubmitter::new(
            ChannelId::new("oem-channel"),
            SigningIdentity::generate("RequirementsMSP"),
            endorser,
            orderer,
        )
        .with_config(SubmissionConfig::for_testing())
    }

    #[tokio::test]
    async fn test_submit_orders_with_proposal_tx_id() {
        let endorser = Arc::new(MockEndorser::new(vec![]));
        let orderer = Arc::new(RecordingOrderer::new());
        let service = submitter(endorser.clone(), orderer.clone());

        let outcome = service
            .submit_transaction(peers(&["p0", "p1"]), invocation(), SubmitOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.endorsements, 2);
        assert_eq!(outcome.result, b"ok".to_vec());
        assert!(outcome.commit.is_none());
        let envelopes = orderer.envelopes.lock();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].tx_id(), &outcome.tx_id);
        assert_eq!(envelopes[0].proposal().tx_id(), &outcome.tx_id);
    }

    #[tokio::test]
    async fn test_failed_endorsement_never_broadcasts() {
        let endorser = Arc::new(MockEndorser::new(vec![
            PeerBehaviour::Fail("Asset with id REQ-1, already exists".into()),
            PeerBehaviour::Fail("Asset with id REQ-1, already exists".into()),
        ]));
        let orderer = Arc::new(RecordingOrderer::new());
        let service = submitter(endorser, orderer.clone());

        let err = service
            .submit_transaction(peers(&["p0", "p1"]), invocation(), SubmitOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Endorsement);
        assert!(err.to_string().contains("already exists"));
        assert_eq!(orderer.broadcasts(), 0);
    }

    #[tokio::test]
    async fn test_partial_endorsement_reports_failures() {
        let endorser = Arc::new(MockEndorser::new(vec![
            PeerBehaviour::Endorse,
            PeerBehaviour::Fail("busy".into()),
        ]));
        let orderer = Arc::new(RecordingOrderer::new());
        let service = submitter(endorser, orderer.clone());

        let outcome = service
            .submit_transaction(peers(&["p0", "p1"]), invocation(), SubmitOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.endorsements, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(orderer.broadcasts(), 1);

        let strict = SubmitOptions {
            policy: Some(EndorsementPolicy::All),
            ..SubmitOptions::default()
        };
        let err = service
            .submit_transaction(peers(&["p0", "p1"]), invocation(), strict)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Endorsement { endorsed: 1, required: 2, .. }));
        assert_eq!(orderer.broadcasts(), 1);
    }

    #[tokio::test]
    async fn test_missing_response_is_transport_error() {
        let endorser = Arc::new(MockEndorser::new(vec![]).short());
        let orderer = Arc::new(RecordingOrderer::new());
        let service = submitter(endorser, orderer.clone());

        let err = service
            .submit_transaction(peers(&["p0", "p1"]), invocation(), SubmitOptions::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SubmitError::Transport {
                phase: Phase::Proposal,
                source: TransportError::ResponseCountMismatch { expected: 2, actual: 1 },
            }
        );
        assert_eq!(orderer.broadcasts(), 0);
    }

    #[tokio::test]
    async fn test_each_attempt_gets_fresh_id() {
        let endorser = Arc::new(MockEndorser::new(vec![]));
        let orderer = Arc::new(RecordingOrderer::new());
        let service = submitter(endorser.clone(), orderer);

        let a = service
            .submit_transaction(peers(&["p0"]), invocation(), SubmitOptions::default())
            .await
            .unwrap();
        let b = service
            .submit_transaction(peers(&["p0"]), invocation(), SubmitOptions::default())
            .await
            .unwrap();
        assert_ne!(a.tx_id, b.tx_id);
        assert_eq!(endorser.calls(), 2);
    }

    #[tokio::test]
    async fn test_rejected_broadcast_is_submission_failure() {
        let endorser = Arc::new(MockEndorser::new(vec![]));
        let orderer = Arc::new(RecordingOrderer::with_ack(BroadcastAck::rejected(
            BroadcastStatus::ServiceUnavailable,
            "no leader",
        )));
        let service = submitter(endorser, orderer);

        let err = service
            .submit_transaction(peers(&["p0"]), invocation(), SubmitOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Submission);
        assert!(matches!(err, SubmitError::Ordering { ref status, .. } if status == "SERVICE_UNAVAILABLE"));
    }

    #[tokio::test]
    async fn test_wait_for_valid_commit() {
        let endorser = Arc::new(MockEndorser::new(vec![]));
        let orderer = Arc::new(RecordingOrderer::new());
        let service = submitter(endorser, orderer)
            .with_commit_notifier(Arc::new(FixedNotifier::committing(ValidationCode::Valid)));

        let options = SubmitOptions {
            commit: Some(CommitWait::Wait {
                timeout: Duration::from_secs(1),
            }),
            ..SubmitOptions::default()
        };
        let outcome = service
            .submit_transaction(peers(&["p0"]), invocation(), options)
            .await
            .unwrap();
        let commit = outcome.commit.unwrap();
        assert_eq!(commit.tx_id, outcome.tx_id);
        assert!(commit.validation_code.is_valid());
    }

    #[tokio::test]
    async fn test_invalid_commit_is_error() {
        let endorser = Arc::new(MockEndorser::new(vec![]));
        let orderer = Arc::new(RecordingOrderer::new());
        let service = submitter(endorser, orderer).with_commit_notifier(Arc::new(
            FixedNotifier::committing(ValidationCode::MvccReadConflict),
        ));

        let options = SubmitOptions {
            commit: Some(CommitWait::Wait {
                timeout: Duration::from_secs(1),
            }),
            ..SubmitOptions::default()
        };
        let err = service
            .submit_transaction(peers(&["p0"]), invocation(), options)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Commit {
                code: ValidationCode::MvccReadConflict,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_commit_timeout_cancels_watch() {
        let endorser = Arc::new(MockEndorser::new(vec![]));
        let orderer = Arc::new(RecordingOrderer::new());
        let notifier = Arc::new(FixedNotifier::silent());
        let service = submitter(endorser, orderer).with_commit_notifier(notifier.clone());

        let options = SubmitOptions {
            commit: Some(CommitWait::Wait {
                timeout: Duration::from_millis(20),
            }),
            ..SubmitOptions::default()
        };
        let err = service
            .submit_transaction(peers(&["p0"]), invocation(), options)
            .await
            .unwrap_err();
        let tx_id = err.tx_id().cloned().unwrap();
        assert!(matches!(err, SubmitError::CommitTimeout { timeout_ms: 20, .. }));
        assert_eq!(notifier.cancelled.lock().as_slice(), &[tx_id]);
    }

    #[tokio::test]
    async fn test_wait_without_notifier_fails_before_broadcast() {
        let endorser = Arc::new(MockEndorser::new(vec![]));
        let orderer = Arc::new(RecordingOrderer::new());
        let service = submitter(endorser, orderer.clone());

        let options = SubmitOptions {
            commit: Some(CommitWait::Wait {
                timeout: Duration::from_millis(20),
            }),
            ..SubmitOptions::default()
        };
        let err = service
            .submit_transaction(peers(&["p0"]), invocation(), options)
            .await
            .unwrap_err();
        assert_eq!(err, SubmitError::NoCommitNotifier);
        assert_eq!(orderer.broadcasts(), 0);
    }

    #[tokio::test]
    async fn test_evaluate_uses_first_target_only() {
        let endorser = Arc::new(MockEndorser::new(vec![]));
        let orderer = Arc::new(RecordingOrderer::new());
        let service = submitter(endorser, orderer.clone());

        let payload = service
            .evaluate_transaction(peers(&["p0", "p1"]), invocation())
            .await
            .unwrap();
        assert_eq!(payload, b"ok".to_vec());
        assert_eq!(orderer.broadcasts(), 0);

        let err = service.evaluate_transaction(vec![], invocation()).await.unwrap_err();
        assert_eq!(err, SubmitError::NoTargets);
    }
}
