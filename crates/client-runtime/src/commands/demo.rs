//! `oemctl demo`: create and share requirements on an in-process network
//! through the gateway, printing the chaincode events as they commit.

use crate::cli::DemoArgs;
use crate::commands::invoke::DEFAULT_TEXT;
use crate::config::RuntimeConfig;
use anyhow::Context;
use fc_01_identity::{ConnectionProfile, InMemoryWallet};
use fc_04_gateway::{CommitStrategy, ContractListener, Gateway, GatewayOptions};
use fc_devnet::{DevNetwork, DevTransport};
use shared_types::payloads::{event_names, Owner, Requirement};
use shared_types::SigningIdentity;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const DEMO_PROFILE: &str = r#"
name: oem-demo
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

const DEMO_CHANNEL: &str = "oem-channel";
const DEMO_USER: &str = "demo-admin";
const EVENT_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct DemoReport {
    pub events: Vec<String>,
    pub first: Requirement,
}

pub async fn run(args: DemoArgs, config: RuntimeConfig) -> anyhow::Result<()> {
    let report = execute(&args, &config).await?;
    for line in &report.events {
        println!("{line}");
    }
    println!("{}", serde_json::to_string_pretty(&report.first)?);
    Ok(())
}

/// Next event line from `listener`, if one arrives in time.
async fn next_line(listener: &mut ContractListener) -> anyhow::Result<Option<String>> {
    match tokio::time::timeout(EVENT_WAIT, listener.next()).await {
        Ok(Some(event)) => {
            let event = event?;
            Ok(Some(format!(
                "block {} {} {}",
                event.block_number,
                event.event.event_name,
                event.payload_lossy()
            )))
        }
        Ok(None) | Err(_) => Ok(None),
    }
}

pub async fn execute(args: &DemoArgs, config: &RuntimeConfig) -> anyhow::Result<DemoReport> {
    if args.assets == 0 {
        anyhow::bail!("--assets must be at least 1");
    }

    let profile = ConnectionProfile::from_yaml_str(DEMO_PROFILE)?;
    let network = DevNetwork::from_profile(&profile, config.devnet.clone())?;
    let wallet = InMemoryWallet::new().with(DEMO_USER, &SigningIdentity::generate("RequirementsMSP"));
    let timeout_ms = config.submission.commit_timeout_ms;
    let options = GatewayOptions::new(
        DEMO_USER,
        Arc::new(wallet),
        Arc::new(DevTransport(Arc::clone(&network))),
    )
    .with_policy(config.gateway.policy)
    .with_commit_strategy(CommitStrategy::AnyPeer { timeout_ms });
    let gateway = Gateway::connect(profile, options).await?;

    let result = drive(&gateway, args, &config.devnet.chaincode).await;
    gateway.disconnect().await;
    let report = result?;
    info!(
        blocks = network.ledger().height(),
        events = report.events.len(),
        "Demo finished"
    );
    Ok(report)
}

async fn drive(gateway: &Gateway, args: &DemoArgs, chaincode: &str) -> anyhow::Result<DemoReport> {
    let channel = gateway.network(DEMO_CHANNEL).await?;
    let contract = channel.contract(chaincode);
    let mut created = contract.add_contract_listener(event_names::NEW_ASSET).await?;
    let mut shared = contract.add_contract_listener(event_names::ASSET_SHARED).await?;

    let creator = serde_json::to_string(&Owner::new("John", "Doe"))?;
    let ids: Vec<String> = (1..=args.assets).map(|n| format!("Req-{n}")).collect();
    for id in &ids {
        contract
            .submit_transaction("NewAsset", &[id.as_str(), creator.as_str(), DEFAULT_TEXT])
            .await
            .with_context(|| format!("creating {id}"))?;
    }

    let designer = serde_json::to_string(&Owner::new("Sam", "Designer"))?;
    let bulk = serde_json::to_string(&ids)?;
    contract
        .submit_transaction("ShareAssetsBulk", &[bulk.as_str(), designer.as_str()])
        .await
        .context("sharing requirements")?;

    let mut events = Vec::new();
    for _ in &ids {
        match next_line(&mut created).await? {
            Some(line) => events.push(line),
            None => break,
        }
    }
    if let Some(line) = next_line(&mut shared).await? {
        events.push(line);
    }
    created.remove();
    shared.remove();

    let payload = contract.evaluate_transaction("GetAsset", &[ids[0].as_str()]).await?;
    let first: Requirement = serde_json::from_slice(&payload)?;
    Ok(DemoReport { events, first })
}
