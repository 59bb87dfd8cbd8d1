//! `oemctl gateway`: the high-level flow. The gateway picks endorsers and
//! waits for commit according to its configured strategy.

use crate::cli::{FunctionArgs, GatewayCommand};
use crate::config::RuntimeConfig;
use crate::transport;
use anyhow::Context;
use fc_04_gateway::{CommitStrategy, Gateway, GatewayConfig};
use std::sync::Arc;
use tracing::info;

pub async fn run(command: GatewayCommand, config: &RuntimeConfig) -> anyhow::Result<()> {
    let mut gateway_config = config.gateway_config();
    if let GatewayCommand::Submit(args) = &command {
        if args.commit.wait && gateway_config.commit_strategy == CommitStrategy::None {
            gateway_config.commit_strategy = CommitStrategy::AnyPeer {
                timeout_ms: config.submission.commit_timeout_ms,
            };
        }
    }

    let gateway = connect(config, &gateway_config).await?;
    let result = execute(&gateway, &gateway_config, command).await;
    gateway.disconnect().await;

    println!("{}", String::from_utf8_lossy(&result?));
    Ok(())
}

/// Load the profile and wallet named by `config` and connect a gateway.
pub async fn connect(
    config: &RuntimeConfig,
    gateway_config: &GatewayConfig,
) -> anyhow::Result<Gateway> {
    let profile = config.bootstrap.load_profile().with_context(|| {
        format!(
            "loading connection profile {}",
            config.bootstrap.connection_profile.display()
        )
    })?;
    let wallet = Arc::new(config.bootstrap.wallet(&profile));
    let transport = transport::connect(config, &profile)?;
    Ok(Gateway::connect(profile, gateway_config.options(wallet, transport)).await?)
}

/// Submit or evaluate one transaction and return its response payload.
pub async fn execute(
    gateway: &Gateway,
    config: &GatewayConfig,
    command: GatewayCommand,
) -> anyhow::Result<Vec<u8>> {
    let network = gateway.network(&config.channel).await?;
    let contract = network.contract(&config.chaincode);

    match command {
        GatewayCommand::Submit(FunctionArgs { function, args, .. }) => {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            let mut transaction = contract.create_transaction(&function);
            let result = transaction.submit(&args).await?;
            if let Some(outcome) = transaction.outcome() {
                info!(
                    tx_id = %outcome.tx_id,
                    endorsements = outcome.endorsements,
                    block = ?outcome.commit.as_ref().map(|c| c.block_number),
                    "Gateway transaction submitted"
                );
            }
            Ok(result)
        }
        GatewayCommand::Evaluate(FunctionArgs { function, args, .. }) => {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            Ok(contract.evaluate_transaction(&function, &args).await?)
        }
    }
}
