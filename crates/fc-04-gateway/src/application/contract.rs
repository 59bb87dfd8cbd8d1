//! # Contract
//!
//! Chaincode-level calls on a network: evaluate, submit, single-use
//! transactions, and contract event listeners.

use crate::application::network::Network;
use crate::domain::errors::GatewayError;
use fc_02_submission::{SubmitOutcome, TransactionSubmissionApi};
use fc_03_event_hub::{ChannelEvent, ChannelEventHub, EventRegistration, RegistrationId};
use shared_types::{ChaincodeEvent, ChaincodeId, ChaincodeInvocation, TransactionId};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Contract {
    network: Network,
    chaincode_id: ChaincodeId,
}

impl Contract {
    pub(crate) fn new(network: Network, chaincode_id: ChaincodeId) -> Self {
        Self {
            network,
            chaincode_id,
        }
    }

    #[must_use]
    pub fn chaincode_id(&self) -> &ChaincodeId {
        &self.chaincode_id
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    fn invocation(&self, name: &str, args: &[&str]) -> ChaincodeInvocation {
        ChaincodeInvocation::new(self.chaincode_id.clone(), name).string_args(args)
    }

    /// Run `name` on one query peer and return its response payload.
    /// Nothing is ordered.
    pub async fn evaluate_transaction(
        &self,
        name: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, GatewayError> {
        let payload = self
            .network
            .submitter()
            .evaluate_transaction(self.network.query_targets(), self.invocation(name, args))
            .await?;
        Ok(payload)
    }

    /// Endorse, order and (per the gateway's commit strategy) await `name`.
    /// Returns the chaincode response payload.
    pub async fn submit_transaction(
        &self,
        name: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, GatewayError> {
        let mut tx = self.create_transaction(name);
        tx.submit(args).await
    }

    /// A single-use handle whose transaction id can be read after submit.
    #[must_use]
    pub fn create_transaction(&self, name: &str) -> Transaction {
        Transaction {
            contract: self.clone(),
            name: name.to_string(),
            submitted: None,
            outcome: None,
        }
    }

    /// Listen for chaincode events of this contract named `event_name`.
    pub async fn add_contract_listener(
        &self,
        event_name: &str,
    ) -> Result<ContractListener, GatewayError> {
        let hub = self.network.event_hub().await?;
        let registration = hub.register_chaincode_event(&self.chaincode_id, event_name);
        debug!(
            chaincode = %self.chaincode_id,
            event = event_name,
            registration = %registration.id,
            "Contract listener added"
        );
        Ok(ContractListener { hub, registration })
    }
}

/// A named transaction that may be submitted once.
pub struct Transaction {
    contract: Contract,
    name: String,
    submitted: Option<TransactionId>,
    outcome: Option<SubmitOutcome>,
}

impl Transaction {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id bound by the proposal. `None` until `submit` got that far.
    #[must_use]
    pub fn transaction_id(&self) -> Option<&TransactionId> {
        self.submitted.as_ref()
    }

    /// Outcome of a successful submit.
    #[must_use]
    pub fn outcome(&self) -> Option<&SubmitOutcome> {
        self.outcome.as_ref()
    }

    pub async fn submit(&mut self, args: &[&str]) -> Result<Vec<u8>, GatewayError> {
        if let Some(tx_id) = &self.submitted {
            return Err(GatewayError::AlreadySubmitted {
                name: self.name.clone(),
                tx_id: tx_id.to_string(),
            });
        }

        let network = &self.contract.network;
        let submitter = network.submitter();
        let config = submitter.config();
        let invocation = self.contract.invocation(&self.name, args);

        let endorsed = match submitter
            .propose(network.endorsement_targets().to_vec(), invocation, &config.policy)
            .await
        {
            Ok(endorsed) => endorsed,
            Err(e) => {
                self.submitted = e.tx_id().cloned();
                return Err(e.into());
            }
        };
        self.submitted = Some(endorsed.tx_id().clone());

        let outcome = submitter.order(endorsed, config.commit_wait()).await?;
        let result = outcome.result.clone();
        self.outcome = Some(outcome);
        Ok(result)
    }

    /// Evaluate on a query peer. Does not consume the transaction.
    pub async fn evaluate(&self, args: &[&str]) -> Result<Vec<u8>, GatewayError> {
        self.contract.evaluate_transaction(&self.name, args).await
    }
}

/// A chaincode event with the block that committed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractEvent {
    pub block_number: u64,
    pub event: ChaincodeEvent,
}

impl ContractEvent {
    #[must_use]
    pub fn payload_lossy(&self) -> String {
        self.event.payload_lossy()
    }
}

pub struct ContractListener {
    hub: Arc<ChannelEventHub>,
    registration: EventRegistration,
}

impl ContractListener {
    #[must_use]
    pub fn id(&self) -> RegistrationId {
        self.registration.id
    }

    /// Next matching event. `None` once removed or after a reported
    /// disconnect.
    pub async fn next(&mut self) -> Option<Result<ContractEvent, GatewayError>> {
        loop {
            match self.registration.stream.recv().await? {
                Ok(ChannelEvent::Chaincode {
                    block_number,
                    event,
                    ..
                }) => {
                    return Some(Ok(ContractEvent {
                        block_number,
                        event,
                    }))
                }
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    /// Stop listening. False if the hub had already dropped it.
    pub fn remove(self) -> bool {
        self.hub.unregister(&self.registration.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::gateway::tests::gateway;
    use crate::domain::options::CommitStrategy;
    use fc_02_submission::SubmitError;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_submit_waits_for_commit() {
        let (loopback, gateway) = gateway(CommitStrategy::AnyPeer { timeout_ms: 2_000 }).await;
        let contract = gateway.network("oem-channel").await.unwrap().contract("oemcc");

        let mut tx = contract.create_transaction("NewAsset");
        assert!(tx.transaction_id().is_none());
        let result = tx.submit(&["Req-1", "{}", "text"]).await.unwrap();

        assert_eq!(result, b"NewAsset".to_vec());
        let outcome = tx.outcome().unwrap();
        assert_eq!(Some(&outcome.tx_id), tx.transaction_id());
        assert!(outcome.commit.is_some());
        assert_eq!(loopback.envelopes.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_transaction_is_single_use() {
        let (loopback, gateway) = gateway(CommitStrategy::None).await;
        let contract = gateway.network("oem-channel").await.unwrap().contract("oemcc");

        let mut tx = contract.create_transaction("NewAsset");
        tx.submit(&["Req-1"]).await.unwrap();
        let err = tx.submit(&["Req-1"]).await.unwrap_err();
        assert!(matches!(err, GatewayError::AlreadySubmitted { .. }));
        assert_eq!(loopback.envelopes.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_evaluate_uses_one_peer_and_orders_nothing() {
        let (loopback, gateway) = gateway(CommitStrategy::None).await;
        let contract = gateway.network("oem-channel").await.unwrap().contract("oemcc");

        let result = contract.evaluate_transaction("GetAsset", &["Req-1"]).await.unwrap();
        assert_eq!(result, b"GetAsset".to_vec());
        assert_eq!(loopback.proposals.lock().last().unwrap().len(), 1);
        assert!(loopback.envelopes.lock().is_empty());
    }

    #[tokio::test]
    async fn test_submit_proposes_to_every_endorser() {
        let (loopback, gateway) = gateway(CommitStrategy::None).await;
        let contract = gateway.network("oem-channel").await.unwrap().contract("oemcc");
        contract.submit_transaction("NewAsset", &["Req-1"]).await.unwrap();
        assert_eq!(loopback.proposals.lock()[0].len(), 2);
    }

    #[tokio::test]
    async fn test_contract_listener_sees_named_events() {
        let (_, gateway) = gateway(CommitStrategy::None).await;
        let contract = gateway.network("oem-channel").await.unwrap().contract("oemcc");
        let mut listener = contract.add_contract_listener("newAsset").await.unwrap();

        contract.submit_transaction("ReadAsset", &["Req-0"]).await.unwrap();
        contract.submit_transaction("newAsset", &["Req-1"]).await.unwrap();

        let event = timeout(Duration::from_secs(2), listener.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(event.event.event_name, "newAsset");
        assert_eq!(event.payload_lossy(), "Req-1");
        assert!(listener.remove());
    }

    #[tokio::test]
    async fn test_removed_listener_ends() {
        let (_, gateway) = gateway(CommitStrategy::None).await;
        let contract = gateway.network("oem-channel").await.unwrap().contract("oemcc");
        let listener = contract.add_contract_listener("newAsset").await.unwrap();
        let hub = contract.network().event_hub().await.unwrap();
        let id = listener.id();
        assert!(listener.remove());
        assert!(!hub.unregister(&id));
    }

    #[tokio::test]
    async fn test_propose_failure_is_endorsement_kind() {
        let (_, gateway) = gateway(CommitStrategy::None).await;
        let network = gateway.network("oem-channel").await.unwrap();
        let err = network
            .submitter()
            .submit_transaction(vec![], ChaincodeInvocation::new("oemcc", "NewAsset"), Default::default())
            .await
            .unwrap_err();
        assert_eq!(err, SubmitError::NoTargets);
        assert_eq!(GatewayError::from(err).exit_code(), 5);
    }
}
