//! Shared setup: a two-organization development network, a bootstrapped
//! client, and an ordering service that records what it was sent.

use async_trait::async_trait;
use fc_01_identity::{ChannelContext, ClientContext, ConnectionProfile, InMemoryWallet};
use fc_02_submission::{
    BroadcastAck, OrderingService, SubmissionConfig, TransactionSubmitter, TransportError,
};
use fc_devnet::domain::ledger::PendingTransaction;
use fc_devnet::{Chaincode, ChaincodeStub, DevNetwork, DevnetConfig, OemContract};
use parking_lot::Mutex;
use shared_types::{
    ChaincodeId, ChaincodeInvocation, PeerName, SigningIdentity, TransactionEnvelope,
    TransactionId,
};
use std::sync::Arc;

pub const PROFILE: &str = r#"
name: oem-network
client:
  organization: Requirements
channels:
  oem-channel:
    orderers: [orderer.oem.com]
    peers:
      peer0.oem.requirements.com: {}
      peer0.oem.designgroup.com: {}
organizations:
  Requirements:
    mspid: RequirementsMSP
    peers: [peer0.oem.requirements.com]
  DesignGroup:
    mspid: DesignGroupMSP
    peers: [peer0.oem.designgroup.com]
orderers:
  orderer.oem.com:
    url: http://localhost:7050
peers:
  peer0.oem.requirements.com:
    url: http://localhost:7051
  peer0.oem.designgroup.com:
    url: http://localhost:9051
"#;

pub const CHANNEL: &str = "oem-channel";
pub const CHAINCODE: &str = "oemcc";
pub const USER: &str = "Admin@requirements.oem.com";
pub const REQUIREMENTS_PEER: &str = "peer0.oem.requirements.com";
pub const DESIGN_PEER: &str = "peer0.oem.designgroup.com";
pub const JOHN_DOE: &str = r#"{"firstname":"John","lastname":"Doe"}"#;
pub const SAM_DESIGNER: &str = r#"{"firstname":"Sam","lastname":"Designer"}"#;

/// Forwards to the development network and keeps every envelope's id.
pub struct RecordingOrderer {
    network: Arc<DevNetwork>,
    sent: Mutex<Vec<TransactionId>>,
}

impl RecordingOrderer {
    pub fn new(network: Arc<DevNetwork>) -> Self {
        Self {
            network,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<TransactionId> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl OrderingService for RecordingOrderer {
    async fn broadcast(&self, envelope: &TransactionEnvelope) -> Result<BroadcastAck, TransportError> {
        self.sent.lock().push(envelope.tx_id().clone());
        self.network.broadcast(envelope).await
    }
}

pub struct TestNetwork {
    pub network: Arc<DevNetwork>,
    pub profile: ConnectionProfile,
    pub client: ClientContext,
    pub channel: ChannelContext,
    pub orderer: Arc<RecordingOrderer>,
}

impl TestNetwork {
    pub async fn start() -> Self {
        Self::with_config(DevnetConfig::for_testing()).await
    }

    pub async fn with_config(config: DevnetConfig) -> Self {
        let profile = ConnectionProfile::from_yaml_str(PROFILE).expect("fixture profile");
        let network = DevNetwork::from_profile(&profile, config).expect("fixture network");
        let wallet = InMemoryWallet::new().with(USER, &SigningIdentity::generate("RequirementsMSP"));
        let client = ClientContext::bootstrap(profile.clone(), USER, &wallet)
            .await
            .expect("fixture identity");
        let channel = client.channel(CHANNEL).expect("fixture channel");
        let orderer = Arc::new(RecordingOrderer::new(Arc::clone(&network)));
        Self {
            network,
            profile,
            client,
            channel,
            orderer,
        }
    }

    /// Submitter that proposes to the network and orders through the recorder.
    pub fn submitter(&self) -> TransactionSubmitter {
        TransactionSubmitter::from_channel(
            &self.channel,
            self.network.clone(),
            self.orderer.clone(),
        )
        .with_config(SubmissionConfig::for_testing())
    }

    pub fn blocks_cut(&self) -> u64 {
        self.network
            .orderer()
            .stats()
            .blocks_cut
            .load(std::sync::atomic::Ordering::Relaxed)
    }

    /// Create every id in one committed block, bypassing endorsement.
    pub fn seed_assets(&self, ids: &[String]) {
        let contract = OemContract::new(CHAINCODE);
        let (tx_id, _) = TransactionId::generate(b"seed");
        let mut stub = ChaincodeStub::new(
            self.network.ledger(),
            ChaincodeId::new(CHAINCODE),
            tx_id.clone(),
            1_600_000_000_000,
        );
        for id in ids {
            contract
                .invoke(
                    &mut stub,
                    "NewAsset",
                    &[
                        id.as_bytes().to_vec(),
                        JOHN_DOE.as_bytes().to_vec(),
                        b"seeded".to_vec(),
                    ],
                )
                .expect("seed asset");
        }
        let (results, _) = stub.finish();
        self.network
            .ledger()
            .commit(PendingTransaction {
                tx_id,
                results,
                event: None,
                policy_satisfied: true,
            })
            .expect("seed block");
    }
}

pub fn peers(names: &[&str]) -> Vec<PeerName> {
    names.iter().map(|n| PeerName::new(*n)).collect()
}

pub fn invocation(function: &str, args: &[&str]) -> ChaincodeInvocation {
    ChaincodeInvocation::new(CHAINCODE, function).string_args(args)
}
